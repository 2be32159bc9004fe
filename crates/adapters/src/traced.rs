// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced hook wrappers for consistent observability

use std::sync::Arc;
use tether_core::{micros, Cleanup, CleanupError, Clock, SystemClock, Validator};

/// Wrapper that adds tracing to any Validator
pub struct TracedValidator<T> {
    slot: String,
    inner: Arc<dyn Validator<T>>,
}

impl<T> TracedValidator<T> {
    pub fn new(slot: impl Into<String>, inner: Arc<dyn Validator<T>>) -> Self {
        Self {
            slot: slot.into(),
            inner,
        }
    }
}

impl<T> Validator<T> for TracedValidator<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn validate(&self, candidate: &T) -> bool {
        let span = tracing::debug_span!("hook.validate", slot = %self.slot, hook = self.inner.name());
        let _guard = span.enter();

        let accepted = self.inner.validate(candidate);
        if accepted {
            tracing::debug!("accepted");
        } else {
            tracing::info!("rejected");
        }
        accepted
    }
}

/// Wrapper that adds tracing to any Cleanup
pub struct TracedCleanup<T> {
    slot: String,
    inner: Arc<dyn Cleanup<T>>,
}

impl<T> TracedCleanup<T> {
    pub fn new(slot: impl Into<String>, inner: Arc<dyn Cleanup<T>>) -> Self {
        Self {
            slot: slot.into(),
            inner,
        }
    }
}

impl<T> Cleanup<T> for TracedCleanup<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn cleanup(&self, target: &T) -> Result<(), CleanupError> {
        let span = tracing::debug_span!("hook.cleanup", slot = %self.slot, hook = self.inner.name());
        let _guard = span.enter();

        let start = SystemClock.now();
        let result = self.inner.cleanup(target);
        let elapsed = SystemClock.since(start);

        // Failures are reported by the slot; keep this at debug
        match &result {
            Ok(()) => tracing::debug!(elapsed_us = micros(elapsed), "released"),
            Err(e) => tracing::debug!(
                elapsed_us = micros(elapsed),
                error = %e,
                "release failed"
            ),
        }

        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
