/*
 * Holds the active-profile state and publishes every accepted change to subscribers.
 * Handlers run synchronously, in registration order, on the thread that made the change.
 * There is no buffering or replay: a late subscriber reads `current()` instead.
 */
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

pub type ProfileChangedHandler = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct ChangeNotifier {
    active: RwLock<Option<String>>,
    subscribers: Mutex<Vec<(SubscriptionId, ProfileChangedHandler)>>,
    next_subscription_id: AtomicU64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last published profile id, `None` until detection or a switch has set it.
    pub fn current(&self) -> Option<String> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(handler)));
        log::trace!("ChangeNotifier: Added subscriber {id:?}");
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        before != subscribers.len()
    }

    /// Records `profile_id` as the active profile without calling any subscriber.
    pub fn set_current(&self, profile_id: &str) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) =
            Some(profile_id.to_string());
        log::info!("ChangeNotifier: Active profile is now '{profile_id}'");
    }

    /*
     * Delivers `profile_id` to every subscriber. The subscriber list is snapshotted first
     * so handlers may call back into the notifier (read `current()`, subscribe,
     * unsubscribe). A panicking handler is logged and skipped; the rest still receive
     * the change. Callers must not hold locks a handler could need.
     */
    pub fn notify(&self, profile_id: &str) {
        let handlers: Vec<(SubscriptionId, ProfileChangedHandler)> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for (id, handler) in handlers {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| handler(profile_id)));
            if delivered.is_err() {
                log::error!("ChangeNotifier: Subscriber {id:?} panicked handling '{profile_id}'");
            }
        }
    }

    #[cfg(test)]
    pub fn publish(&self, profile_id: &str) {
        self.set_current(profile_id);
        self.notify(profile_id);
    }
}
