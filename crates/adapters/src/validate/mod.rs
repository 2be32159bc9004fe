// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validators for candidate handles

use tether_core::Validator;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeValidator, ValidateCall};

/// Validator backed by a predicate closure
pub struct FnValidator<F> {
    name: String,
    predicate: F,
}

impl<F> FnValidator<F> {
    pub fn new(name: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }
}

impl<T, F> Validator<T> for FnValidator<F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, candidate: &T) -> bool {
        (self.predicate)(candidate)
    }
}

/// Handles that can report what kind of resource they are
///
/// A handle enum spanning UI nodes, engine objects and custom handles
/// implements this so slots can insist on one kind.
pub trait HandleKind {
    fn kind(&self) -> &str;
}

/// Accepts only handles of the expected kind
#[derive(Debug, Clone)]
pub struct ExpectKind {
    label: String,
    expected: String,
}

impl ExpectKind {
    pub fn new(expected: impl Into<String>) -> Self {
        let expected = expected.into();
        Self {
            label: format!("expect-kind:{}", expected),
            expected,
        }
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }
}

impl<T: HandleKind> Validator<T> for ExpectKind {
    fn name(&self) -> &str {
        &self.label
    }

    fn validate(&self, candidate: &T) -> bool {
        candidate.kind() == self.expected
    }
}
