// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Priority-ordered pending list
//!
//! New entries are ordered by priority (descending) then arrival
//! (ascending): an entry is inserted just before the first entry of
//! strictly lower priority, so equal priorities keep enqueue order.
//! Requeued entries go to the back without being re-sorted.

use std::collections::VecDeque;

#[derive(Debug)]
struct Entry<I> {
    priority: i32,
    item: I,
}

#[derive(Debug)]
pub struct PendingList<I> {
    entries: VecDeque<Entry<I>>,
}

impl<I> PendingList<I> {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Insert a fresh arrival in priority order
    pub fn insert(&mut self, priority: i32, item: I) {
        let at = self
            .entries
            .iter()
            .position(|e| e.priority < priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(at, Entry { priority, item });
    }

    /// Put an entry back at the very end regardless of its priority
    pub fn requeue(&mut self, priority: i32, item: I) {
        self.entries.push_back(Entry { priority, item });
    }

    pub fn pop_front(&mut self) -> Option<I> {
        self.entries.pop_front().map(|e| e.item)
    }

    /// Remove the first entry matching `pred`
    pub fn remove_first(&mut self, pred: impl Fn(&I) -> bool) -> Option<I> {
        let at = self.entries.iter().position(|e| pred(&e.item))?;
        self.entries.remove(at).map(|e| e.item)
    }

    pub fn drain(&mut self) -> Vec<I> {
        self.entries.drain(..).map(|e| e.item).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &I> {
        self.entries.iter().map(|e| &e.item)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<I> Default for PendingList<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
