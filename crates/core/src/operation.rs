// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-call operation options and the result descriptor

use crate::clock::millis;
use crate::error::OperationError;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Options for one queued operation
///
/// Unset `retries` and `timeout` fall back to the engine configuration;
/// no timeout is imposed unless one is configured somewhere.
#[derive(Debug, Clone, Default)]
pub struct OperationOptions {
    pub id: Option<String>,
    pub priority: i32,
    pub retries: Option<u32>,
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl OperationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Cancelling this token skips the item if it has not started, and
    /// signals the running attempt if it has
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Descriptor every queued operation resolves to
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult<R> {
    pub item_id: String,
    pub outcome: Result<R, OperationError>,
    /// Execution time summed over all attempts
    pub duration: Duration,
    /// Attempts actually started (0 if cancelled before starting)
    pub attempts: u32,
    /// Wall-clock settlement time
    pub timestamp: DateTime<Utc>,
}

impl<R> OperationResult<R> {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn result(&self) -> Option<&R> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&OperationError> {
        self.outcome.as_ref().err()
    }

    pub fn into_result(self) -> Result<R, OperationError> {
        self.outcome
    }

    pub fn duration_ms(&self) -> u64 {
        millis(self.duration)
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
