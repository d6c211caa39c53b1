use super::dispatch::Dispatch;
use super::provider::{Provider, ProviderState};
use crate::error::{Error, Result};
use crate::runtime::RenderScope;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// A pure function mapping the previous state and an action to the next state.
pub type Reducer<S, A> = Arc<dyn Fn(&S, A) -> S + Send + Sync>;

/// Process-unique identity of a [`StateManager`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ManagerId(u64);

impl ManagerId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::SeqCst))
    }

    #[cfg(test)]
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a provider hands to its consumers: the state and dispatch pair.
pub struct ContextValue<S, A> {
    pub state: Arc<S>,
    pub dispatch: Dispatch<A>,
}

impl<S, A> Clone for ContextValue<S, A> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            dispatch: self.dispatch.clone(),
        }
    }
}

/// An isolated, reducer-driven store scoped to provider subtrees.
///
/// A manager is only a recipe: the reducer and the initial state. State
/// lives in the [`Provider`]s mounted from it, and every mounted provider
/// is independent of the others.
///
/// # Examples
///
/// ```
/// use scoped_store::create_state_manager;
///
/// #[derive(Debug, PartialEq)]
/// struct Likes {
///     count: i32,
/// }
///
/// enum LikesAction {
///     Like,
///     Dislike,
/// }
///
/// let likes = create_state_manager(
///     |state: &Likes, action: LikesAction| match action {
///         LikesAction::Like => Likes { count: state.count + 1 },
///         LikesAction::Dislike => Likes { count: state.count - 1 },
///     },
///     Likes { count: 5 },
/// );
///
/// let provider = likes.provider();
/// provider.scope(|| {
///     let dispatch = likes.use_dispatch().unwrap();
///     dispatch.dispatch(LikesAction::Like);
///     dispatch.dispatch(LikesAction::Like);
///     dispatch.dispatch(LikesAction::Dislike);
/// });
///
/// provider.scope(|| {
///     assert_eq!(likes.use_selector(|s| s.count).unwrap(), 6);
/// });
/// ```
pub struct StateManager<S, A> {
    id: ManagerId,
    name: Option<Arc<str>>,
    reducer: Reducer<S, A>,
    initial: Arc<S>,
}

impl<S, A> StateManager<S, A>
where
    S: Send + Sync + 'static,
    A: 'static,
{
    /// Create a new manager from a reducer and an initial state.
    pub fn new<R>(reducer: R, initial: S) -> Self
    where
        R: Fn(&S, A) -> S + Send + Sync + 'static,
    {
        Self {
            id: ManagerId::next(),
            name: None,
            reducer: Arc::new(reducer),
            initial: Arc::new(initial),
        }
    }

    /// Create a new manager with a diagnostic name.
    ///
    /// The name is reported in [`Error::MissingProvider`].
    pub fn named<R>(name: impl Into<Arc<str>>, reducer: R, initial: S) -> Self
    where
        R: Fn(&S, A) -> S + Send + Sync + 'static,
    {
        Self {
            name: Some(name.into()),
            ..Self::new(reducer, initial)
        }
    }

    /// Get the manager's unique ID.
    pub fn id(&self) -> ManagerId {
        self.id
    }

    /// Get the manager's diagnostic name, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The state every newly mounted provider starts from.
    pub fn initial_state(&self) -> Arc<S> {
        Arc::clone(&self.initial)
    }

    /// Mount a new provider instance holding the initial state.
    pub fn provider(&self) -> Provider<S, A> {
        Provider::mount(self.id, Arc::clone(&self.reducer), Arc::clone(&self.initial))
    }

    /// Current state of the nearest enclosing provider.
    pub fn use_state(&self) -> Result<Arc<S>> {
        self.context().map(|instance| instance.snapshot())
    }

    /// Dispatch handle of the nearest enclosing provider.
    pub fn use_dispatch(&self) -> Result<Dispatch<A>> {
        self.context().map(|instance| instance.dispatch())
    }

    /// Project the current state of the nearest enclosing provider.
    ///
    /// The selector runs on every call; nothing is memoized.
    pub fn use_selector<T, F>(&self, selector: F) -> Result<T>
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.use_state()?;
        Ok(selector(&state))
    }

    /// Hand the full state and dispatch pair to `f` with a single lookup.
    pub fn consume<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(ContextValue<S, A>) -> R,
    {
        let instance = self.context()?;
        Ok(f(ContextValue {
            state: instance.snapshot(),
            dispatch: instance.dispatch(),
        }))
    }

    fn context(&self) -> Result<Arc<ProviderState<S, A>>> {
        let missing = || {
            debug!(manager = %self.id, name = ?self.name, "no provider in scope");
            Error::MissingProvider {
                manager: self.id,
                name: self.name.clone(),
            }
        };

        let instance = RenderScope::nearest(self.id).ok_or_else(missing)?;
        instance
            .downcast::<ProviderState<S, A>>()
            .map_err(|_| missing())
    }
}

impl<S, A> Clone for StateManager<S, A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            reducer: Arc::clone(&self.reducer),
            initial: Arc::clone(&self.initial),
        }
    }
}

impl<S, A> fmt::Debug for StateManager<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateManager")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Create a new state manager from a reducer and an initial state.
///
/// # Example
///
/// ```
/// use scoped_store::create_state_manager;
///
/// let counter = create_state_manager(|n: &u32, by: u32| n + by, 0);
/// let provider = counter.provider();
/// provider.dispatcher().dispatch(3);
/// assert_eq!(*provider.state(), 3);
/// ```
pub fn create_state_manager<S, A, R>(reducer: R, initial: S) -> StateManager<S, A>
where
    S: Send + Sync + 'static,
    A: 'static,
    R: Fn(&S, A) -> S + Send + Sync + 'static,
{
    StateManager::new(reducer, initial)
}
