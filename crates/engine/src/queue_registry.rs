// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One operation queue per slot name, created on first reference

use crate::queue::OperationQueue;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use tether_core::{Clock, EventBus, IdGen, QueueError, QueueStats};

struct Queues<T, C, I> {
    by_name: HashMap<String, OperationQueue<T, C, I>>,
    closed: bool,
}

/// Name-keyed owner of [`OperationQueue`]s
///
/// Queues share the registry's clock, id generator and event bus but no
/// other state, so work on different names never waits on each other.
pub struct QueueRegistry<T, C, I> {
    clock: C,
    id_gen: I,
    events: EventBus,
    queues: Mutex<Queues<T, C, I>>,
}

impl<T, C, I> QueueRegistry<T, C, I>
where
    T: Send + 'static,
    C: Clock,
    I: IdGen,
{
    pub fn new(clock: C, id_gen: I, events: EventBus) -> Self {
        Self {
            clock,
            id_gen,
            events,
            queues: Mutex::new(Queues {
                by_name: HashMap::new(),
                closed: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Queues<T, C, I>> {
        self.queues.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue for `name`, creating it if this is the first reference
    pub fn queue(&self, name: &str) -> Result<OperationQueue<T, C, I>, QueueError> {
        let mut queues = self.lock();
        if queues.closed {
            return Err(QueueError::Closed {
                slot: name.to_string(),
            });
        }
        let queue = queues.by_name.entry(name.to_string()).or_insert_with(|| {
            tracing::debug!(slot = name, "created queue");
            OperationQueue::new(
                name,
                self.clock.clone(),
                self.id_gen.clone(),
                self.events.clone(),
            )
        });
        Ok(queue.clone())
    }

    /// Existing queue for `name`, without creating one
    pub fn get(&self, name: &str) -> Option<OperationQueue<T, C, I>> {
        self.lock().by_name.get(name).cloned()
    }

    /// Cancel pending work on one name; unknown names have nothing to cancel
    pub fn cancel_all(&self, name: &str) -> usize {
        self.get(name).map_or(0, |queue| queue.cancel_all())
    }

    /// Close every queue and forget them, resetting their statistics
    ///
    /// The registry refuses new queues afterwards. Returns the number of
    /// pending items that were cancelled.
    pub fn shutdown_all(&self) -> usize {
        let drained: Vec<_> = {
            let mut queues = self.lock();
            queues.closed = true;
            queues.by_name.drain().map(|(_, queue)| queue).collect()
        };
        let cancelled: usize = drained.iter().map(OperationQueue::shutdown).sum();
        tracing::info!(queues = drained.len(), cancelled, "queue registry shut down");
        cancelled
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.lock().by_name.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn stats_for(&self, name: &str) -> Option<QueueStats> {
        self.get(name).map(|queue| queue.stats())
    }

    /// Per-name statistics for every queue created so far
    pub fn stats(&self) -> BTreeMap<String, QueueStats> {
        let queues: Vec<_> = self.lock().by_name.values().cloned().collect();
        queues
            .into_iter()
            .map(|queue| (queue.slot().to_string(), queue.stats()))
            .collect()
    }

    /// All names folded into one snapshot
    pub fn aggregate(&self) -> QueueStats {
        self.stats()
            .values()
            .fold(QueueStats::default(), |mut total, stats| {
                total.merge(stats);
                total
            })
    }
}

#[cfg(test)]
#[path = "queue_registry_tests.rs"]
mod tests;
