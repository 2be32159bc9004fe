// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle events emitted by slots and operation queues

use serde::{Deserialize, Serialize};

/// Observable transitions of slots and queue items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A candidate (or its fallback) was accepted into a slot
    SlotBound {
        slot: String,
        fallback: bool,
        replaced: bool,
        waiters: usize,
    },
    /// The validator rejected a candidate and no fallback applied
    SlotRejected { slot: String, reason: String },
    SlotUnbound { slot: String },
    /// A cleanup hook failed; the failure goes no further than this
    SlotCleanupFailed { slot: String, error: String },
    SlotWaitersCancelled { slot: String, count: usize },

    QueueItemEnqueued {
        slot: String,
        item_id: String,
        priority: i32,
    },
    QueueItemStarted {
        slot: String,
        item_id: String,
        attempt: u32,
    },
    /// An attempt failed and the item went back to the pending list
    QueueItemRetry {
        slot: String,
        item_id: String,
        attempt: u32,
        retries_remaining: u32,
        error: String,
    },
    QueueItemCompleted {
        slot: String,
        item_id: String,
        attempts: u32,
        duration_ms: u64,
    },
    QueueItemFailed {
        slot: String,
        item_id: String,
        attempts: u32,
        error: String,
    },
    QueueItemTimeout {
        slot: String,
        item_id: String,
        attempt: u32,
        after_ms: u64,
    },
    QueueItemCancelled { slot: String, item_id: String },
    QueueShutdown { slot: String, cancelled: usize },
}

impl Event {
    /// Pattern-matchable name, e.g. `queue:item:retry`
    pub fn name(&self) -> String {
        match self {
            Event::SlotBound { fallback: true, .. } => "slot:fallback".to_string(),
            Event::SlotBound { .. } => "slot:bound".to_string(),
            Event::SlotRejected { .. } => "slot:rejected".to_string(),
            Event::SlotUnbound { .. } => "slot:unbound".to_string(),
            Event::SlotCleanupFailed { .. } => "slot:cleanup_failed".to_string(),
            Event::SlotWaitersCancelled { .. } => "slot:waiters_cancelled".to_string(),

            Event::QueueItemEnqueued { .. } => "queue:item:enqueued".to_string(),
            Event::QueueItemStarted { .. } => "queue:item:started".to_string(),
            Event::QueueItemRetry { .. } => "queue:item:retry".to_string(),
            Event::QueueItemCompleted { .. } => "queue:item:completed".to_string(),
            Event::QueueItemFailed { .. } => "queue:item:failed".to_string(),
            Event::QueueItemTimeout { .. } => "queue:item:timeout".to_string(),
            Event::QueueItemCancelled { .. } => "queue:item:cancelled".to_string(),
            Event::QueueShutdown { .. } => "queue:shutdown".to_string(),
        }
    }

    /// Slot name the event concerns
    pub fn slot(&self) -> &str {
        match self {
            Event::SlotBound { slot, .. }
            | Event::SlotRejected { slot, .. }
            | Event::SlotUnbound { slot }
            | Event::SlotCleanupFailed { slot, .. }
            | Event::SlotWaitersCancelled { slot, .. }
            | Event::QueueItemEnqueued { slot, .. }
            | Event::QueueItemStarted { slot, .. }
            | Event::QueueItemRetry { slot, .. }
            | Event::QueueItemCompleted { slot, .. }
            | Event::QueueItemFailed { slot, .. }
            | Event::QueueItemTimeout { slot, .. }
            | Event::QueueItemCancelled { slot, .. }
            | Event::QueueShutdown { slot, .. } => slot,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
