// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bus for routing events to subscribers

use super::log::{EventLog, EventRecord};
use super::subscription::{EventPattern, SubscriberId, Subscription};
use crate::event::Event;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::mpsc;

/// Sender for event delivery
pub type EventSender = mpsc::UnboundedSender<Event>;
/// Receiver for event delivery
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

/// Routes events to matching subscribers and records them in the trail
///
/// Clones share the same subscribers and log.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<RwLock<HashMap<SubscriberId, (Subscription, EventSender)>>>,
    log: Arc<Mutex<EventLog>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_log_capacity(256)
    }

    pub fn with_log_capacity(capacity: usize) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            log: Arc::new(Mutex::new(EventLog::new(capacity))),
        }
    }

    /// Subscribe to events matching the subscription's patterns
    pub fn subscribe(&self, subscription: Subscription) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = subscription.id.clone();

        let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        subs.insert(id, (subscription, tx));

        rx
    }

    pub fn unsubscribe(&self, id: &SubscriberId) {
        let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        subs.remove(id);
    }

    /// Record the event and deliver it to every matching subscriber
    pub fn publish(&self, event: Event) {
        let name = event.name();
        tracing::trace!(event = %name, slot = event.slot(), "publish");

        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .append(event.clone());

        let mut closed = Vec::new();
        {
            let subs = self.subscribers.read().unwrap_or_else(|e| e.into_inner());
            for (id, (subscription, tx)) in subs.iter() {
                if subscription.matches(&name) && tx.send(event.clone()).is_err() {
                    closed.push(id.clone());
                }
            }
        }
        for id in closed {
            self.unsubscribe(&id);
        }
    }

    pub fn publish_all(&self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.publish(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Recent events, oldest first
    pub fn recent(&self) -> Vec<EventRecord> {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).records()
    }

    /// Recent events whose name matches `pattern`
    pub fn query(&self, pattern: &str) -> Vec<EventRecord> {
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .query(&EventPattern::new(pattern))
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
