//! Event Coordinator
//!
//! Fan-out of lifecycle events to registered observers. Delivery is synchronous and in
//! registration order; a panicking observer is isolated and logged, never surfaced to the
//! operation that posted the event.

use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{trace, warn};

use crate::types::Token;

/// Lifecycle event.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Event {
    /// A token endpoint exchange produced a validated token.
    TokenCreated {
        token: Token,
        /// Identifier of the credential that owns the token, when the caller has one.
        credential: Option<String>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TokenCreated { .. } => "token_created",
        }
    }
}

/// Receives events posted to an [`EventCoordinator`].
#[cfg_attr(test, mockall::automock)]
pub trait EventObserver: Send + Sync {
    fn on_event(&self, event: &Event);
}

type ObserverList = RwLock<Vec<(u64, Arc<dyn EventObserver>)>>;

struct Inner {
    observers: ObserverList,
    next_id: AtomicU64,
}

/// Ordered set of observers. Cheap to clone; clones share the same observers.
#[derive(Clone)]
pub struct EventCoordinator {
    inner: Arc<Inner>,
}

impl Default for EventCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventCoordinator")
            .field("observers", &self.observer_count())
            .finish()
    }
}

impl EventCoordinator {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                observers: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Register an observer. It stays registered until the returned handle is dropped.
    #[must_use = "dropping the subscription unregisters the observer"]
    pub fn subscribe(&self, observer: Arc<dyn EventObserver>) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.observers.write().push((id, observer));
        Subscription {
            coordinator: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Deliver `event` to every observer in registration order.
    pub fn post(&self, event: Event) {
        // snapshot, so observers may subscribe or unsubscribe while handling
        let observers: Vec<_> = self
            .inner
            .observers
            .read()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();

        trace!(event = event.name(), observers = observers.len(), "Posting event");

        for observer in observers {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| observer.on_event(&event))) {
                let message = if let Some(s) = panic.downcast_ref::<&str>() {
                    (*s).to_string()
                } else if let Some(s) = panic.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                warn!(event = event.name(), panic = %message, "Event observer panicked");
            }
        }
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.read().len()
    }
}

/// Registration handle returned by [`EventCoordinator::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    coordinator: Weak<Inner>,
    id: u64,
}

impl Subscription {
    /// Unregister now rather than at drop.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.coordinator.upgrade() {
            inner.observers.write().retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use parking_lot::Mutex;

    fn token_created() -> Event {
        Event::TokenCreated {
            token: Token {
                token_type: "Bearer".to_string(),
                expires_in: 3600,
                access_token: "exampleAccessToken".to_string(),
                scope: None,
                refresh_token: None,
                id_token: None,
                device_secret: None,
                issued_at: Utc::now(),
            },
            credential: None,
        }
    }

    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl EventObserver for Recorder {
        fn on_event(&self, _event: &Event) {
            self.log.lock().push(self.label);
        }
    }

    struct Panicker;

    impl EventObserver for Panicker {
        fn on_event(&self, _event: &Event) {
            panic!("observer failure");
        }
    }

    #[test]
    fn test_post_reaches_observer() {
        let coordinator = EventCoordinator::new();
        let mut observer = MockEventObserver::new();
        observer
            .expect_on_event()
            .withf(|event| matches!(event, Event::TokenCreated { credential: None, .. }))
            .times(1)
            .return_const(());

        let _subscription = coordinator.subscribe(Arc::new(observer));
        coordinator.post(token_created());
    }

    #[test]
    fn test_delivery_follows_registration_order() {
        let coordinator = EventCoordinator::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let _first = coordinator.subscribe(Arc::new(Recorder {
            label: "first",
            log: log.clone(),
        }));
        let _second = coordinator.subscribe(Arc::new(Recorder {
            label: "second",
            log: log.clone(),
        }));
        coordinator.post(token_created());

        assert_eq!(*log.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_panicking_observer_is_isolated() {
        let coordinator = EventCoordinator::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let _panicker = coordinator.subscribe(Arc::new(Panicker));
        let _recorder = coordinator.subscribe(Arc::new(Recorder {
            label: "after",
            log: log.clone(),
        }));
        coordinator.post(token_created());

        assert_eq!(*log.lock(), vec!["after"]);
    }

    #[test]
    fn test_dropping_subscription_unregisters() {
        let coordinator = EventCoordinator::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let subscription = coordinator.subscribe(Arc::new(Recorder {
            label: "observer",
            log: log.clone(),
        }));
        assert_eq!(coordinator.observer_count(), 1);

        drop(subscription);
        coordinator.post(token_created());

        assert_eq!(coordinator.observer_count(), 0);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_subscription_outliving_coordinator() {
        let coordinator = EventCoordinator::new();
        let subscription = coordinator.subscribe(Arc::new(Panicker));

        drop(coordinator);
        subscription.cancel();
    }
}
