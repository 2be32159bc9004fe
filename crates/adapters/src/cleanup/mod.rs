// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cleanup hooks run when a handle is replaced or unbound

use tether_core::{Cleanup, CleanupError};

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{CleanupCall, FakeCleanup};

/// Cleanup backed by a closure
pub struct FnCleanup<F> {
    name: String,
    release: F,
}

impl<F> FnCleanup<F> {
    pub fn new(name: impl Into<String>, release: F) -> Self {
        Self {
            name: name.into(),
            release,
        }
    }
}

impl<T, F> Cleanup<T> for FnCleanup<F>
where
    F: Fn(&T) -> Result<(), CleanupError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn cleanup(&self, target: &T) -> Result<(), CleanupError> {
        (self.release)(target)
    }
}

/// Cleanup that does nothing, for handles that need no release step
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpCleanup;

impl NoOpCleanup {
    pub fn new() -> Self {
        Self
    }
}

impl<T> Cleanup<T> for NoOpCleanup {
    fn name(&self) -> &str {
        "noop"
    }

    fn cleanup(&self, _target: &T) -> Result<(), CleanupError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn fn_cleanup_invokes_closure() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        let cleanup = FnCleanup::new("detach", move |_: &u8| -> Result<(), CleanupError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        cleanup.cleanup(&1).unwrap();
        cleanup.cleanup(&2).unwrap();
        assert_eq!(released.load(Ordering::SeqCst), 2);
        assert_eq!(Cleanup::<u8>::name(&cleanup), "detach");
    }

    #[test]
    fn fn_cleanup_propagates_error_to_caller() {
        let cleanup = FnCleanup::new("detach", |_: &u8| -> Result<(), CleanupError> {
            Err(CleanupError::new("busy"))
        });
        assert_eq!(cleanup.cleanup(&1), Err(CleanupError::new("busy")));
    }

    #[test]
    fn noop_cleanup_always_succeeds() {
        assert!(NoOpCleanup::new().cleanup(&"anything").is_ok());
    }
}
