// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! What a binder wants done when its candidate is rejected

use std::fmt;
use std::sync::Arc;

/// Source of a replacement handle for the `Fallback` strategy
#[derive(Clone)]
pub enum Fallback<T> {
    Value(T),
    Produce(Arc<dyn Fn() -> T + Send + Sync>),
}

impl<T: Clone> Fallback<T> {
    pub fn produce<F>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Fallback::Produce(Arc::new(f))
    }

    pub fn resolve(&self) -> T {
        match self {
            Fallback::Value(value) => value.clone(),
            Fallback::Produce(f) => f(),
        }
    }
}

impl<T> fmt::Debug for Fallback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::Value(_) => f.write_str("Fallback::Value(..)"),
            Fallback::Produce(_) => f.write_str("Fallback::Produce(..)"),
        }
    }
}

/// Error-recovery strategy chosen by the caller of `bind`
#[derive(Clone)]
pub enum RecoveryStrategy<T> {
    /// Return `ValidationFailed` to the binder
    Fail,
    /// Bind the fallback instead; it is not validated again
    Fallback(Fallback<T>),
    /// Return `ValidationFailed { retryable: true }`; the caller binds again
    Retry,
}

impl<T> Default for RecoveryStrategy<T> {
    fn default() -> Self {
        RecoveryStrategy::Fail
    }
}

impl<T> fmt::Debug for RecoveryStrategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryStrategy::Fail => f.write_str("Fail"),
            RecoveryStrategy::Fallback(fallback) => write!(f, "Fallback({:?})", fallback),
            RecoveryStrategy::Retry => f.write_str("Retry"),
        }
    }
}

impl<T> RecoveryStrategy<T> {
    pub fn fallback(value: T) -> Self {
        RecoveryStrategy::Fallback(Fallback::Value(value))
    }

    pub fn fallback_with<F>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        RecoveryStrategy::Fallback(Fallback::Produce(Arc::new(f)))
    }
}
