use super::dispatch::Dispatch;
use super::manager::{ManagerId, Reducer};
use crate::runtime::{RenderScope, ScopedInstance};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

type Subscriber<S> = Box<dyn Fn(&S) + Send + Sync>;

/// Removal side of a subscriber list, erased over the state type.
trait SubscriberSet: Send + Sync {
    fn remove_subscriber(&self, subscriber_id: u64);
}

/// The live `(state, dispatch)` pair of one mounted provider.
pub(crate) struct ProviderState<S, A> {
    manager: ManagerId,
    reducer: Reducer<S, A>,
    state: Mutex<Arc<S>>,
    dispatch: Dispatch<A>,
    subscribers: RwLock<Vec<(u64, Subscriber<S>)>>,
    next_subscriber: AtomicU64,
    version: AtomicU64,
}

impl<S, A> ProviderState<S, A>
where
    S: Send + Sync + 'static,
    A: 'static,
{
    fn new(manager: ManagerId, reducer: Reducer<S, A>, initial: Arc<S>) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let target = Weak::clone(weak);
            let dispatch = Dispatch::new(move |action: A| match target.upgrade() {
                Some(instance) => instance.apply(action),
                None => warn!(manager = %manager, "action dispatched to an unmounted provider, dropping it"),
            });

            Self {
                manager,
                reducer,
                state: Mutex::new(initial),
                dispatch,
                subscribers: RwLock::new(Vec::new()),
                next_subscriber: AtomicU64::new(0),
                version: AtomicU64::new(0),
            }
        })
    }

    /// Run the reducer against the current snapshot and replace it.
    fn apply(&self, action: A) {
        let next = {
            let mut state = self.state.lock();
            let next = Arc::new((self.reducer)(&**state, action));
            *state = Arc::clone(&next);
            next
        };
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(manager = %self.manager, version, "action reduced");
        self.notify(&next);
    }

    fn notify(&self, state: &S) {
        // Subscribers may dispatch again from inside the callback
        let subscribers = self.subscribers.read_recursive();
        for (_, subscriber) in subscribers.iter() {
            subscriber(state);
        }
    }

    pub(crate) fn snapshot(&self) -> Arc<S> {
        Arc::clone(&self.state.lock())
    }

    pub(crate) fn dispatch(&self) -> Dispatch<A> {
        self.dispatch.clone()
    }
}

impl<S, A> SubscriberSet for ProviderState<S, A>
where
    S: Send + Sync + 'static,
    A: 'static,
{
    fn remove_subscriber(&self, subscriber_id: u64) {
        self.subscribers.write().retain(|(id, _)| *id != subscriber_id);
    }
}

/// RAII guard for a provider subscription.
///
/// Dropping the guard removes the callback. It does not keep the provider
/// mounted.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    subscriber_id: u64,
    provider: Weak<dyn SubscriberSet>,
}

impl Subscription {
    /// Remove the callback now; same as dropping the guard.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.upgrade() {
            provider.remove_subscriber(self.subscriber_id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("subscriber_id", &self.subscriber_id)
            .finish()
    }
}

/// A mounted provider: one independent state instance for a subtree.
///
/// Created by [`StateManager::provider`](super::StateManager::provider).
/// Components rendered inside [`Provider::scope`] read and dispatch against
/// this instance. Dropping the provider unmounts it; dispatch handles that
/// outlive it become no-ops.
pub struct Provider<S, A> {
    shared: Arc<ProviderState<S, A>>,
}

impl<S, A> Provider<S, A>
where
    S: Send + Sync + 'static,
    A: 'static,
{
    pub(crate) fn mount(manager: ManagerId, reducer: Reducer<S, A>, initial: Arc<S>) -> Self {
        debug!(manager = %manager, "provider mounted");
        Self {
            shared: ProviderState::new(manager, reducer, initial),
        }
    }

    /// Render `children` with this provider visible to their accessors.
    ///
    /// Returns whatever `children` returns, unchanged.
    pub fn scope<F, R>(&self, children: F) -> R
    where
        F: FnOnce() -> R,
    {
        let instance: ScopedInstance = Arc::clone(&self.shared) as ScopedInstance;
        trace!(
            manager = %self.shared.manager,
            depth = RenderScope::depth() + 1,
            "entering provider scope"
        );
        RenderScope::enter(self.shared.manager, instance, children)
    }

    /// The current state snapshot, read without entering the scope.
    pub fn state(&self) -> Arc<S> {
        self.shared.snapshot()
    }

    /// The dispatch handle of this instance.
    pub fn dispatcher(&self) -> Dispatch<A> {
        self.shared.dispatch()
    }

    /// Number of actions this instance has processed.
    pub fn version(&self) -> u64 {
        self.shared.version.load(Ordering::SeqCst)
    }

    /// The manager this provider was mounted from.
    pub fn manager(&self) -> ManagerId {
        self.shared.manager
    }

    /// Subscribe to state changes.
    ///
    /// The callback is called with the new state after every dispatched
    /// action, which lets a host render loop schedule the next render. It
    /// stays registered until the returned [`Subscription`] is dropped.
    /// Callbacks may dispatch, but must not subscribe or drop a
    /// subscription from inside a notification.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let subscriber_id = self.shared.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.shared
            .subscribers
            .write()
            .push((subscriber_id, Box::new(callback)));

        let shared: Arc<dyn SubscriberSet> = Arc::clone(&self.shared) as Arc<dyn SubscriberSet>;
        Subscription {
            subscriber_id,
            provider: Arc::downgrade(&shared),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.read().len()
    }
}

impl<S, A> fmt::Debug for Provider<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("manager", &self.shared.manager)
            .field("version", &self.shared.version.load(Ordering::SeqCst))
            .field("subscribers", &self.shared.subscribers.read().len())
            .finish_non_exhaustive()
    }
}

impl<S, A> Drop for Provider<S, A> {
    fn drop(&mut self) {
        debug!(manager = %self.shared.manager, "provider unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::AtomicUsize;

    fn counter(manager: u64) -> Provider<i32, i32> {
        let reducer: Reducer<i32, i32> = Arc::new(|count: &i32, by: i32| count + by);
        Provider::mount(ManagerId::from_raw(manager), reducer, Arc::new(0))
    }

    #[test]
    fn dispatch_replaces_state() {
        let provider = counter(8_000);
        let dispatch = provider.dispatcher();

        dispatch.dispatch(2);
        dispatch.dispatch(3);

        assert_eq!(*provider.state(), 5);
        assert_eq!(provider.version(), 2);
    }

    #[test]
    fn reducer_panic_recovers() {
        let reducer: Reducer<i32, i32> = Arc::new(|count: &i32, by: i32| {
            if by < 0 {
                panic!("negative step");
            }
            count + by
        });
        let provider = Provider::mount(ManagerId::from_raw(8_005), reducer, Arc::new(0));
        let dispatch = provider.dispatcher();

        dispatch.dispatch(1);
        let result = panic::catch_unwind(AssertUnwindSafe(|| dispatch.dispatch(-1)));
        assert!(result.is_err());
        assert_eq!(*provider.state(), 1);
        assert_eq!(provider.version(), 1);

        dispatch.dispatch(2);
        assert_eq!(*provider.state(), 3);
        assert_eq!(provider.version(), 2);
    }

    #[test]
    fn dispatcher_identity_is_stable() {
        let provider = counter(8_001);
        assert!(provider.dispatcher().ptr_eq(&provider.dispatcher()));
    }

    #[test]
    fn subscribers_see_new_state() {
        let provider = counter(8_002);
        let seen = Arc::new(AtomicUsize::new(0));

        let _subscription = provider.subscribe({
            let seen = Arc::clone(&seen);
            move |count| {
                seen.store(*count as usize, Ordering::SeqCst);
            }
        });

        provider.dispatcher().dispatch(4);
        assert_eq!(seen.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn dropping_subscription_stops_notifications() {
        let provider = counter(8_006);
        let calls = Arc::new(AtomicUsize::new(0));

        let subscriptions: Vec<Subscription> = (0..100)
            .map(|_| {
                let calls = Arc::clone(&calls);
                provider.subscribe(move |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();
        assert_eq!(provider.subscriber_count(), 100);

        drop(subscriptions);
        assert_eq!(provider.subscriber_count(), 0);

        let kept = {
            let calls = Arc::clone(&calls);
            provider.subscribe(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };
        provider.dispatcher().dispatch(1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        kept.unsubscribe();
        provider.dispatcher().dispatch(1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*provider.state(), 2);
    }

    #[test]
    fn subscription_outliving_provider_is_inert() {
        let provider = counter(8_007);
        let subscription = provider.subscribe(|_| {});
        drop(provider);
        drop(subscription);
    }

    #[test]
    fn debug_shows_manager_and_version() {
        let provider = counter(8_008);
        provider.dispatcher().dispatch(1);
        let rendered = format!("{provider:?}");
        assert!(rendered.contains("Provider"));
        assert!(rendered.contains("version: 1"));
    }

    #[test]
    fn dispatch_after_unmount_is_dropped() {
        let provider = counter(8_003);
        let dispatch = provider.dispatcher();
        drop(provider);

        dispatch.dispatch(1);
    }

    #[test]
    fn old_snapshots_are_not_mutated() {
        let provider = counter(8_004);
        let before = provider.state();
        provider.dispatcher().dispatch(10);
        assert_eq!(*before, 0);
        assert_eq!(*provider.state(), 10);
    }
}
