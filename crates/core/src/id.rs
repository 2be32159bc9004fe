// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Item ids for queued operations
//!
//! A caller may name an item through `OperationOptions::with_id`; the
//! queue asks its [`IdGen`] otherwise. Ids are what `cancel(item_id)` and
//! the queue events refer to.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub trait IdGen: Clone + Send + Sync + 'static {
    fn next(&self) -> String;

    /// The caller's id when it gave a non-empty one, a fresh id otherwise
    fn assign(&self, requested: Option<String>) -> String {
        match requested {
            Some(id) if !id.is_empty() => id,
            _ => self.next(),
        }
    }
}

/// Random v4 UUIDs, the engine default
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        uuid::Uuid::new_v4().hyphenated().to_string()
    }
}

/// `<prefix>-1`, `<prefix>-2`, ... with one counter shared by all clones
///
/// Every per-slot queue gets a clone of the engine's generator, so ids
/// stay unique across slots.
#[derive(Clone, Debug)]
pub struct SequentialIdGen {
    prefix: Arc<str>,
    issued: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Arc::from(prefix.into()),
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("op")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{n}", self.prefix)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
