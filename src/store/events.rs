//! store/events.rs - Change Stream
//!
//! The UI layer observes the store through filtered change streams: a
//! subscription carries a predicate, and every committed mutation that
//! matches is delivered as a `(wall id, new version)` event over a
//! channel. Disconnected receivers are pruned on the next notify.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

/// One committed wall mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub wall_id: u64,
    pub version: u64,
}

/// Receiving end of a filtered change stream
pub struct Subscription {
    receiver: Receiver<ChangeEvent>,
}

impl Subscription {
    /// Drain every event delivered so far
    pub fn drain(&self) -> Vec<ChangeEvent> {
        self.receiver.try_iter().collect()
    }

    /// Next pending event, if any
    pub fn try_next(&self) -> Option<ChangeEvent> {
        self.receiver.try_recv().ok()
    }
}

type Predicate = Box<dyn Fn(&ChangeEvent) -> bool + Send + Sync>;

/// Registry of live subscriptions
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: Mutex<Vec<(Predicate, Sender<ChangeEvent>)>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a predicate-filtered subscription
    pub fn subscribe<F>(&self, predicate: F) -> Subscription
    where
        F: Fn(&ChangeEvent) -> bool + Send + Sync + 'static,
    {
        let (sender, receiver) = channel();
        self.subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .push((Box::new(predicate), sender));
        Subscription { receiver }
    }

    /// Deliver an event to every matching live subscriber
    pub fn notify(&self, event: ChangeEvent) {
        let mut subscribers = self.subscribers.lock().expect("subscriber lock poisoned");
        subscribers.retain(|(predicate, sender)| {
            if predicate(&event) {
                sender.send(event).is_ok()
            } else {
                // Silent subscribers are only pruned once a matching
                // delivery fails.
                true
            }
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .len()
    }
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
