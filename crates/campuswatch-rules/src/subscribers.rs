//! Notification subscriber registry.

use campuswatch_types::SecurityNotification;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

type Callback = Box<dyn Fn(&SecurityNotification) + Send + Sync>;

#[derive(Default)]
struct Inner {
    callbacks: Mutex<HashMap<u64, Callback>>,
    next_id: AtomicU64,
}

/// Registry of notification listeners.
///
/// Listeners are invoked synchronously for every created notification. A
/// panicking listener is logged and skipped; it never aborts delivery to the
/// others or event processing itself.
#[derive(Clone, Default)]
pub struct SubscriberRegistry {
    inner: Arc<Inner>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Dropping the returned token unsubscribes it.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SecurityNotification) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.callbacks.lock().insert(id, Box::new(callback));
        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver a notification to every current listener.
    pub fn broadcast(&self, notification: &SecurityNotification) {
        let callbacks = self.inner.callbacks.lock();
        for (id, callback) in callbacks.iter() {
            let result = catch_unwind(AssertUnwindSafe(|| callback(notification)));
            if result.is_err() {
                warn!(subscriber = id, "notification subscriber panicked");
            }
        }
    }

    /// Number of active listeners.
    pub fn len(&self) -> usize {
        self.inner.callbacks.lock().len()
    }

    /// Whether there are no listeners.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Token tying a listener to the registry. Unsubscribes on drop.
pub struct Subscription {
    id: u64,
    inner: std::sync::Weak<Inner>,
}

impl Subscription {
    /// Remove the listener now.
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.callbacks.lock().remove(&self.id);
        }
    }
}
