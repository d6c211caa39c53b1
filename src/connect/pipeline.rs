use super::combined::{CombinedDispatch, CombinedState};
use crate::props::Props;
use std::fmt;
use std::sync::Arc;

/// Derives props from combined state and the component's own props.
pub type MapStateToProps = Arc<dyn Fn(&CombinedState, &Props) -> Props + Send + Sync>;

/// Derives props (typically callbacks) from combined dispatch handles.
pub type MapDispatchToProps = Arc<dyn Fn(&CombinedDispatch, &Props) -> Props + Send + Sync>;

/// Builds the final props from state props, dispatch props and own props.
pub type MergeProps = Arc<dyn Fn(Props, Props, Props) -> Props + Send + Sync>;

/// The three-stage prop derivation of a connected component.
///
/// 1. `map_state_to_props(state, own)` yields the state props, or empty.
/// 2. `map_dispatch_to_props(dispatch, own)` yields the dispatch props, or empty.
/// 3. `merge_props(state_props, dispatch_props, own)` yields the final props.
///    Without it the final props are `own`, then state props, then dispatch
///    props, later keys winning.
///
/// With no stage configured the own props pass through untouched.
#[derive(Clone, Default)]
pub struct PropPipeline {
    map_state: Option<MapStateToProps>,
    map_dispatch: Option<MapDispatchToProps>,
    merge: Option<MergeProps>,
}

impl PropPipeline {
    /// A pipeline with no stage configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stage deriving state props, replacing any previous one.
    pub fn map_state_to_props<F>(mut self, f: F) -> Self
    where
        F: Fn(&CombinedState, &Props) -> Props + Send + Sync + 'static,
    {
        self.map_state = Some(Arc::new(f));
        self
    }

    /// Set the stage deriving dispatch props, replacing any previous one.
    pub fn map_dispatch_to_props<F>(mut self, f: F) -> Self
    where
        F: Fn(&CombinedDispatch, &Props) -> Props + Send + Sync + 'static,
    {
        self.map_dispatch = Some(Arc::new(f));
        self
    }

    /// Set the merge stage, which takes over the default precedence merge.
    pub fn merge_props<F>(mut self, f: F) -> Self
    where
        F: Fn(Props, Props, Props) -> Props + Send + Sync + 'static,
    {
        self.merge = Some(Arc::new(f));
        self
    }

    /// Whether no stage is configured, so own props pass through.
    pub fn is_passthrough(&self) -> bool {
        self.map_state.is_none() && self.map_dispatch.is_none() && self.merge.is_none()
    }

    /// Run the pipeline for one render.
    pub fn run(&self, state: &CombinedState, dispatch: &CombinedDispatch, own: Props) -> Props {
        if self.is_passthrough() {
            return own;
        }

        let state_props = match &self.map_state {
            Some(map_state) => map_state(state, &own),
            None => Props::new(),
        };
        let dispatch_props = match &self.map_dispatch {
            Some(map_dispatch) => map_dispatch(dispatch, &own),
            None => Props::new(),
        };

        match &self.merge {
            Some(merge) => merge(state_props, dispatch_props, own),
            None => Props::merge(own, state_props, dispatch_props),
        }
    }
}

impl fmt::Debug for PropPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropPipeline")
            .field("map_state_to_props", &self.map_state.is_some())
            .field("map_dispatch_to_props", &self.map_dispatch.is_some())
            .field("merge_props", &self.merge.is_some())
            .finish()
    }
}
