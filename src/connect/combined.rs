use crate::error::Result;
use crate::manager::{Dispatch, ManagerId, StateManager};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

type AnyValue = Arc<dyn Any + Send + Sync>;

/// A manager with its state and action types erased, so managers of
/// different types can share one map.
trait ErasedManager: Send + Sync {
    fn id(&self) -> ManagerId;

    /// Read the nearest provider's state snapshot and dispatch handle.
    fn read(&self) -> Result<(AnyValue, AnyValue)>;
}

impl<S, A> ErasedManager for StateManager<S, A>
where
    S: Send + Sync + 'static,
    A: 'static,
{
    fn id(&self) -> ManagerId {
        StateManager::id(self)
    }

    fn read(&self) -> Result<(AnyValue, AnyValue)> {
        self.consume(|ctx| {
            let state: AnyValue = ctx.state;
            let dispatch: AnyValue = Arc::new(ctx.dispatch);
            (state, dispatch)
        })
    }
}

/// Named state managers a component is connected to.
///
/// Keys are chosen by the caller and become the keys of the
/// [`CombinedState`] and [`CombinedDispatch`] built on every render.
#[derive(Clone, Default)]
pub struct Managers {
    entries: BTreeMap<String, Arc<dyn ErasedManager>>,
}

impl Managers {
    /// Create an empty manager map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Managers::insert`].
    pub fn with<S, A>(mut self, key: impl Into<String>, manager: &StateManager<S, A>) -> Self
    where
        S: Send + Sync + 'static,
        A: 'static,
    {
        self.insert(key, manager);
        self
    }

    /// Add a manager under `key`, replacing any manager already there.
    pub fn insert<S, A>(&mut self, key: impl Into<String>, manager: &StateManager<S, A>)
    where
        S: Send + Sync + 'static,
        A: 'static,
    {
        self.entries.insert(key.into(), Arc::new(manager.clone()));
    }

    /// Whether an entry exists under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read every manager's nearest provider in one pass.
    ///
    /// Fails on the first manager with no provider in scope, so callers
    /// never see a partially combined snapshot.
    pub fn combine(&self) -> Result<(CombinedState, CombinedDispatch)> {
        let mut state = BTreeMap::new();
        let mut dispatch = BTreeMap::new();

        for (key, manager) in &self.entries {
            let (snapshot, handle) = manager.read()?;
            state.insert(key.clone(), snapshot);
            dispatch.insert(key.clone(), handle);
        }

        Ok((
            CombinedState { entries: state },
            CombinedDispatch { entries: dispatch },
        ))
    }
}

impl fmt::Debug for Managers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(key, manager)| (key, manager.id())))
            .finish()
    }
}

/// State snapshots of every connected manager, keyed like [`Managers`].
#[derive(Clone, Default)]
pub struct CombinedState {
    entries: BTreeMap<String, AnyValue>,
}

impl CombinedState {
    /// The state under `key`.
    ///
    /// Returns `None` when no manager is connected under `key` or its state
    /// is not an `S`.
    pub fn get<S: 'static>(&self, key: &str) -> Option<&S> {
        self.entries.get(key)?.downcast_ref::<S>()
    }

    /// A shared handle to the state under `key`.
    pub fn snapshot<S>(&self, key: &str) -> Option<Arc<S>>
    where
        S: Send + Sync + 'static,
    {
        Arc::clone(self.entries.get(key)?).downcast::<S>().ok()
    }

    /// Whether an entry exists under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for CombinedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// Dispatch handles of every connected manager, keyed like [`Managers`].
#[derive(Clone, Default)]
pub struct CombinedDispatch {
    entries: BTreeMap<String, AnyValue>,
}

impl CombinedDispatch {
    /// The dispatch handle under `key`, if it accepts `A` actions.
    pub fn try_get<A: 'static>(&self, key: &str) -> Option<Dispatch<A>> {
        self.entries.get(key)?.downcast_ref::<Dispatch<A>>().cloned()
    }

    /// The dispatch handle under `key`.
    ///
    /// Falls back to a handle that drops every action when nothing usable is
    /// connected under `key`, so dispatch-derived callbacks stay safe to call.
    /// With no managers connected the fallback is expected; otherwise it
    /// means a wrong key or action type and is logged as a warning. Use
    /// [`CombinedDispatch::try_get`] to check instead.
    pub fn get<A: 'static>(&self, key: &str) -> Dispatch<A> {
        match self.try_get(key) {
            Some(dispatch) => dispatch,
            None if self.entries.contains_key(key) => {
                warn!(key, action = std::any::type_name::<A>(), "dispatch action type mismatch, using no-op");
                Dispatch::noop()
            }
            None if self.entries.is_empty() => {
                debug!(key, "no managers connected, using no-op dispatch");
                Dispatch::noop()
            }
            None => {
                warn!(
                    key,
                    connected = ?self.entries.keys().collect::<Vec<_>>(),
                    "no manager connected under key, using no-op dispatch"
                );
                Dispatch::noop()
            }
        }
    }

    /// Dispatch `action` to the manager under `key`.
    pub fn dispatch<A: 'static>(&self, key: &str, action: A) {
        self.get(key).dispatch(action)
    }

    /// Whether an entry exists under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for CombinedDispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
