use super::combined::{CombinedDispatch, CombinedState, Managers};
use super::pipeline::PropPipeline;
use crate::component::Component;
use crate::error::Result;
use crate::props::Props;
use std::sync::Arc;
use tracing::trace;

/// Connect components to a set of named state managers.
///
/// Returns a [`Connector`] on which the optional mapping functions are set
/// before wrapping a component. An empty [`Managers`] map gives the
/// component empty combined state and no-op dispatch.
///
/// # Example
///
/// ```
/// use scoped_store::{connect, create_state_manager, Managers, Props};
///
/// let likes = create_state_manager(|count: &i32, by: i32| count + by, 5);
///
/// let counter = connect(Managers::new().with("likes", &likes))
///     .map_state_to_props(|state, _own| {
///         Props::new().with("count", *state.get::<i32>("likes").unwrap_or(&0))
///     })
///     .map_dispatch_to_props(|dispatch, _own| {
///         let likes = dispatch.get::<i32>("likes");
///         Props::new().with_callback("on_like", move || likes.dispatch(1))
///     })
///     .wrap(|props: Props| props);
///
/// let provider = likes.provider();
/// let props = provider.scope(|| counter.render(Props::new())).unwrap();
/// props.callback("on_like").unwrap().call();
///
/// let props = provider.scope(|| counter.render(Props::new())).unwrap();
/// assert_eq!(props.get::<i32>("count"), Some(&6));
/// ```
pub fn connect(managers: Managers) -> Connector {
    Connector {
        managers,
        pipeline: PropPipeline::new(),
    }
}

/// A connection to named managers, waiting for a component to wrap.
#[derive(Clone, Debug)]
pub struct Connector {
    managers: Managers,
    pipeline: PropPipeline,
}

impl Connector {
    /// Derive state props from the combined state.
    pub fn map_state_to_props<F>(mut self, f: F) -> Self
    where
        F: Fn(&CombinedState, &Props) -> Props + Send + Sync + 'static,
    {
        self.pipeline = self.pipeline.map_state_to_props(f);
        self
    }

    /// Derive dispatch props from the combined dispatch handles.
    pub fn map_dispatch_to_props<F>(mut self, f: F) -> Self
    where
        F: Fn(&CombinedDispatch, &Props) -> Props + Send + Sync + 'static,
    {
        self.pipeline = self.pipeline.map_dispatch_to_props(f);
        self
    }

    /// Take full control of the final props.
    ///
    /// Only what `f` returns reaches the component; own props are not
    /// forwarded unless `f` forwards them.
    pub fn merge_props<F>(mut self, f: F) -> Self
    where
        F: Fn(Props, Props, Props) -> Props + Send + Sync + 'static,
    {
        self.pipeline = self.pipeline.merge_props(f);
        self
    }

    /// Wrap a presentation component.
    pub fn wrap<C: Component>(self, component: C) -> Connected<C> {
        Connected {
            managers: self.managers,
            pipeline: Arc::new(self.pipeline),
            component,
        }
    }
}

/// A component whose props are derived from connected state managers.
///
/// Every render re-reads each manager's nearest provider, so state updates
/// are picked up on the next render. Nothing is cached between renders.
#[derive(Clone, Debug)]
pub struct Connected<C> {
    managers: Managers,
    pipeline: Arc<PropPipeline>,
    component: C,
}

impl<C: Component> Connected<C> {
    /// Render the wrapped component from its own props.
    ///
    /// Fails with [`Error::MissingProvider`](crate::Error::MissingProvider)
    /// before the component is rendered if any connected manager has no
    /// provider in scope.
    pub fn render(&self, own: Props) -> Result<C::Output> {
        let (state, dispatch) = self.managers.combine()?;
        let props = self.pipeline.run(&state, &dispatch, own);
        trace!(managers = self.managers.len(), props = props.len(), "rendering connected component");
        Ok(self.component.render(props))
    }

    /// The wrapped component.
    pub fn inner(&self) -> &C {
        &self.component
    }
}

impl<C: Component> Component for Connected<C> {
    type Output = Result<C::Output>;

    fn render(&self, props: Props) -> Self::Output {
        Connected::render(self, props)
    }
}
