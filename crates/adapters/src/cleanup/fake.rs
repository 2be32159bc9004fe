// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake cleanup for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use tether_core::{Cleanup, CleanupError};

/// Recorded cleanup call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupCall {
    pub target: String,
    pub failed: bool,
}

/// Cleanup that records every call and fails for configured targets
#[derive(Clone, Default)]
pub struct FakeCleanup {
    failing: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<Vec<CleanupCall>>>,
}

impl FakeCleanup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail cleanup of targets whose `Debug` rendering equals `target`
    pub fn fail_on(&self, target: impl Into<String>) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(target.into());
    }

    pub fn calls(&self) -> Vec<CleanupCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Rendered targets cleaned so far, in order
    pub fn cleaned(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.target).collect()
    }
}

impl<T: Debug> Cleanup<T> for FakeCleanup {
    fn name(&self) -> &str {
        "fake"
    }

    fn cleanup(&self, target: &T) -> Result<(), CleanupError> {
        let rendered = format!("{:?}", target);
        let failed = self
            .failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&rendered);
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(CleanupCall {
                target: rendered.clone(),
                failed,
            });
        if failed {
            Err(CleanupError::new(format!("fake cleanup refused {}", rendered)))
        } else {
            Ok(())
        }
    }
}
