//! # Cart Observers
//!
//! Change notification for whoever renders the cart (header badge, drawer,
//! checkout summary).
//!
//! Observers are called synchronously, on the thread that committed the
//! mutation, after the change is visible and only when something observable
//! changed. An observer must not block: anything slow belongs on a channel.

use std::fmt;
use tokio::sync::watch;
use uuid::Uuid;

use shopcart_core::CartSnapshot;

// =============================================================================
// Observer Trait
// =============================================================================

/// Receives the new snapshot after every committed change.
pub trait CartObserver: Send + Sync {
    fn on_change(&self, snapshot: &CartSnapshot);
}

impl<F> CartObserver for F
where
    F: Fn(&CartSnapshot) + Send + Sync,
{
    fn on_change(&self, snapshot: &CartSnapshot) {
        self(snapshot)
    }
}

/// Publishes every change into a `watch` channel.
///
/// Used by the cart service to back [`crate::CartHandle::watch`].
pub struct WatchObserver {
    tx: watch::Sender<CartSnapshot>,
}

impl WatchObserver {
    pub fn new(tx: watch::Sender<CartSnapshot>) -> Self {
        WatchObserver { tx }
    }
}

impl CartObserver for WatchObserver {
    fn on_change(&self, snapshot: &CartSnapshot) {
        // Succeeds even when every receiver is gone
        self.tx.send_replace(snapshot.clone());
    }
}

// =============================================================================
// Subscription Id
// =============================================================================

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub(crate) fn new() -> Self {
        SubscriptionId(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_closure_observer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let observer = move |_: &CartSnapshot| {
            counter.fetch_add(1, Ordering::SeqCst);
        };

        observer.on_change(&CartSnapshot::default());
        observer.on_change(&CartSnapshot::default());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_watch_observer_publishes_latest() {
        let (tx, rx) = watch::channel(CartSnapshot::default());
        let observer = WatchObserver::new(tx);

        let mut snapshot = CartSnapshot::default();
        snapshot.total_quantity = 3;
        observer.on_change(&snapshot);

        assert_eq!(rx.borrow().total_quantity, 3);
    }

    #[test]
    fn test_subscription_ids_are_unique() {
        assert_ne!(SubscriptionId::new(), SubscriptionId::new());
    }
}
