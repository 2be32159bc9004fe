// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for slots, queues and operations
//!
//! Structural errors (`SlotNotFound`, enqueue after shutdown) are returned
//! to the caller directly. Operation outcomes travel inside an
//! [`OperationResult`](crate::OperationResult) as [`OperationError`].
//! [`CleanupError`] never leaves the engine; it is logged and counted.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by slot binding, waiting and registry lookups
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefError {
    #[error("slot not found: {0}")]
    SlotNotFound(String),
    #[error("validation failed for slot {slot}: {reason}")]
    ValidationFailed {
        slot: String,
        reason: String,
        /// Set when the caller asked for the retry strategy
        retryable: bool,
    },
    #[error("slot {slot} was not bound within {waited:?}")]
    MountTimeout { slot: String, waited: Duration },
    #[error("wait for slot {slot} was cancelled")]
    WaitCancelled { slot: String },
    #[error("operation queue for slot {slot} is closed")]
    QueueClosed { slot: String },
}

impl RefError {
    /// Name of the slot the error refers to
    pub fn slot(&self) -> &str {
        match self {
            RefError::SlotNotFound(slot)
            | RefError::ValidationFailed { slot, .. }
            | RefError::MountTimeout { slot, .. }
            | RefError::WaitCancelled { slot }
            | RefError::QueueClosed { slot } => slot,
        }
    }
}

/// Failure reported in an operation result descriptor
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OperationError {
    #[error("operation {item_id} on slot {slot} failed: {message}")]
    Failed {
        slot: String,
        item_id: String,
        message: String,
    },
    #[error("operation {item_id} on slot {slot} timed out after {after:?}")]
    Timeout {
        slot: String,
        item_id: String,
        after: Duration,
    },
    #[error("operation {item_id} on slot {slot} was cancelled")]
    Cancelled { slot: String, item_id: String },
    #[error("operation {item_id} on slot {slot} found no bound target")]
    Unbound { slot: String, item_id: String },
    #[error("operation {item_id} on slot {slot} panicked")]
    Panicked { slot: String, item_id: String },
}

impl OperationError {
    pub fn slot(&self) -> &str {
        match self {
            OperationError::Failed { slot, .. }
            | OperationError::Timeout { slot, .. }
            | OperationError::Cancelled { slot, .. }
            | OperationError::Unbound { slot, .. }
            | OperationError::Panicked { slot, .. } => slot,
        }
    }

    pub fn item_id(&self) -> &str {
        match self {
            OperationError::Failed { item_id, .. }
            | OperationError::Timeout { item_id, .. }
            | OperationError::Cancelled { item_id, .. }
            | OperationError::Unbound { item_id, .. }
            | OperationError::Panicked { item_id, .. } => item_id,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, OperationError::Timeout { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, OperationError::Cancelled { .. })
    }
}

/// Errors raised synchronously by an operation queue
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("operation queue for slot {slot} is closed")]
    Closed { slot: String },
}

impl From<QueueError> for RefError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Closed { slot } => RefError::QueueClosed { slot },
        }
    }
}

/// Failure reported by a cleanup hook
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cleanup failed: {0}")]
pub struct CleanupError(pub String);

impl CleanupError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors loading engine configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
