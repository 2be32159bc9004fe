// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake validator for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use tether_core::Validator;

/// Recorded validation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateCall {
    pub candidate: String,
    pub accepted: bool,
}

/// Validator that rejects configured candidates and records every call
#[derive(Clone, Default)]
pub struct FakeValidator {
    rejected: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<Vec<ValidateCall>>>,
}

impl FakeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject candidates whose `Debug` rendering equals `candidate`
    pub fn reject(&self, candidate: impl Into<String>) {
        self.rejected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(candidate.into());
    }

    pub fn calls(&self) -> Vec<ValidateCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl<T: Debug> Validator<T> for FakeValidator {
    fn name(&self) -> &str {
        "fake"
    }

    fn validate(&self, candidate: &T) -> bool {
        let rendered = format!("{:?}", candidate);
        let accepted = !self
            .rejected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&rendered);
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ValidateCall {
                candidate: rendered,
                accepted,
            });
        accepted
    }
}
