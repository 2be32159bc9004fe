// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain policy seams injected into slots
//!
//! A slot never knows what kind of handle it holds. Whatever it means for
//! a handle to be acceptable, or to be released, comes from the domain
//! through these two traits.

use crate::error::CleanupError;

/// Decides whether a candidate handle may be bound
pub trait Validator<T>: Send + Sync {
    /// Short label used in logs and rejection reasons
    fn name(&self) -> &str {
        "validator"
    }

    fn validate(&self, candidate: &T) -> bool;
}

/// Releases a handle that is being replaced or unbound
///
/// Failures are logged and counted by the slot, never propagated.
pub trait Cleanup<T>: Send + Sync {
    fn name(&self) -> &str {
        "cleanup"
    }

    fn cleanup(&self, target: &T) -> Result<(), CleanupError>;
}
