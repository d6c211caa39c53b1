use crate::manager::ManagerId;
use std::any::Any;
use std::cell::RefCell;
use std::sync::Arc;

/// A type-erased provider instance as stored on the scope stack.
pub(crate) type ScopedInstance = Arc<dyn Any + Send + Sync>;

struct ScopeFrame {
    manager: ManagerId,
    instance: ScopedInstance,
}

// Thread-local stack of mounted providers, innermost last
thread_local! {
    static PROVIDER_STACK: RefCell<Vec<ScopeFrame>> = RefCell::new(vec![]);
}

/// The render-time scope in which providers are visible to accessors.
///
/// A provider pushes itself for the duration of its children's render and
/// pops itself afterwards. Accessors resolve the nearest enclosing frame for
/// their manager, so inner providers shadow outer ones.
///
/// # Examples
///
/// ```
/// use scoped_store::create_state_manager;
///
/// let counter = create_state_manager(|count: &i32, by: i32| count + by, 0);
/// let provider = counter.provider();
///
/// provider.scope(|| {
///     assert_eq!(*counter.use_state().unwrap(), 0);
/// });
/// // Outside the scope the provider is no longer visible
/// assert!(counter.use_state().is_err());
/// ```
pub(crate) struct RenderScope;

impl RenderScope {
    /// Run a function with a provider instance visible to its accessors.
    ///
    /// The frame is popped even when `f` panics; the panic is then resumed
    /// so caller errors propagate unchanged.
    pub(crate) fn enter<F, R>(manager: ManagerId, instance: ScopedInstance, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        PROVIDER_STACK.with(|stack| {
            stack.borrow_mut().push(ScopeFrame { manager, instance });
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

        PROVIDER_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });

        match result {
            Ok(r) => r,
            Err(e) => std::panic::resume_unwind(e),
        }
    }

    /// Find the nearest enclosing provider instance for a manager.
    pub(crate) fn nearest(manager: ManagerId) -> Option<ScopedInstance> {
        PROVIDER_STACK.with(|stack| {
            stack
                .borrow()
                .iter()
                .rev()
                .find(|frame| frame.manager == manager)
                .map(|frame| Arc::clone(&frame.instance))
        })
    }

    /// Number of provider frames currently entered on this thread.
    pub(crate) fn depth() -> usize {
        PROVIDER_STACK.with(|stack| stack.borrow().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(tag: &'static str) -> ScopedInstance {
        Arc::new(tag)
    }

    fn tag_of(instance: ScopedInstance) -> &'static str {
        *instance.downcast_ref::<&'static str>().unwrap()
    }

    #[test]
    fn nothing_visible_outside_a_scope() {
        assert!(RenderScope::nearest(ManagerId::from_raw(9_000)).is_none());
    }

    #[test]
    fn nearest_frame_wins() {
        let id = ManagerId::from_raw(9_001);
        RenderScope::enter(id, instance("outer"), || {
            assert_eq!(tag_of(RenderScope::nearest(id).unwrap()), "outer");
            RenderScope::enter(id, instance("inner"), || {
                assert_eq!(tag_of(RenderScope::nearest(id).unwrap()), "inner");
            });
            assert_eq!(tag_of(RenderScope::nearest(id).unwrap()), "outer");
        });
        assert!(RenderScope::nearest(id).is_none());
    }

    #[test]
    fn frames_are_keyed_by_manager() {
        let a = ManagerId::from_raw(9_002);
        let b = ManagerId::from_raw(9_003);
        RenderScope::enter(a, instance("a"), || {
            RenderScope::enter(b, instance("b"), || {
                assert_eq!(tag_of(RenderScope::nearest(a).unwrap()), "a");
                assert_eq!(tag_of(RenderScope::nearest(b).unwrap()), "b");
            });
        });
    }

    #[test]
    fn frame_popped_after_panic() {
        let id = ManagerId::from_raw(9_004);
        let before = RenderScope::depth();
        let result = std::panic::catch_unwind(|| {
            RenderScope::enter(id, instance("doomed"), || panic!("render failed"));
        });
        assert!(result.is_err());
        assert_eq!(RenderScope::depth(), before);
        assert!(RenderScope::nearest(id).is_none());
    }
}
