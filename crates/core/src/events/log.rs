// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded in-memory event trail

use super::subscription::EventPattern;
use crate::clock::{millis, Clock, SystemClock};
use crate::event::Event;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Instant;

/// A logged event with metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Monotonic sequence number, never reused after eviction
    pub sequence: u64,
    /// Milliseconds since the log was created, on the engine clock
    pub elapsed_ms: u64,
    pub name: String,
    pub event: Event,
}

/// Keeps the most recent `capacity` events; older records are evicted
#[derive(Debug)]
pub struct EventLog {
    records: VecDeque<EventRecord>,
    capacity: usize,
    sequence: u64,
    start_time: Instant,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            sequence: 0,
            start_time: SystemClock.now(),
        }
    }

    pub fn append(&mut self, event: Event) -> Option<&EventRecord> {
        self.sequence += 1;
        if self.capacity == 0 {
            return None;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(EventRecord {
            sequence: self.sequence,
            elapsed_ms: millis(SystemClock.since(self.start_time)),
            name: event.name(),
            event,
        });
        self.records.back()
    }

    pub fn records(&self) -> Vec<EventRecord> {
        self.records.iter().cloned().collect()
    }

    /// Records whose name matches `pattern`, oldest first
    pub fn query(&self, pattern: &EventPattern) -> Vec<EventRecord> {
        self.records
            .iter()
            .filter(|r| pattern.matches(&r.name))
            .cloned()
            .collect()
    }

    /// Records newer than `sequence`
    pub fn after(&self, sequence: u64) -> Vec<EventRecord> {
        self.records
            .iter()
            .filter(|r| r.sequence > sequence)
            .cloned()
            .collect()
    }

    pub fn current_sequence(&self) -> u64 {
        self.sequence
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
