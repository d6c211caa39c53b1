use std::fmt;
use std::sync::Arc;

type DispatchFn<A> = Arc<dyn Fn(A) + Send + Sync>;

/// A handle that feeds actions into a provider instance's reducer.
///
/// Handles are cheap to clone and may be moved into event handlers or other
/// threads. Every handle obtained from the same provider instance shares one
/// identity, see [`Dispatch::ptr_eq`].
pub struct Dispatch<A> {
    send: DispatchFn<A>,
}

impl<A: 'static> Dispatch<A> {
    pub(crate) fn new<F>(send: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            send: Arc::new(send),
        }
    }

    /// A dispatch that drops every action.
    ///
    /// Used when a connected component has no manager for a key.
    pub fn noop() -> Self {
        Self::new(|_action| {})
    }

    /// Apply an action to the provider instance this handle belongs to.
    pub fn dispatch(&self, action: A) {
        (self.send)(action)
    }

    /// Whether two handles address the same provider instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.send, &other.send)
    }
}

impl<A> Clone for Dispatch<A> {
    fn clone(&self) -> Self {
        Self {
            send: Arc::clone(&self.send),
        }
    }
}

impl<A> fmt::Debug for Dispatch<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("target", &Arc::as_ptr(&self.send).cast::<()>())
            .finish()
    }
}
