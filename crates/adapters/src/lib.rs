// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Validator and cleanup implementations for slot definitions

pub mod cleanup;
pub mod traced;
pub mod validate;

pub use cleanup::{FnCleanup, NoOpCleanup};
pub use traced::{TracedCleanup, TracedValidator};
pub use validate::{ExpectKind, FnValidator, HandleKind};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use cleanup::{CleanupCall, FakeCleanup};
#[cfg(any(test, feature = "test-support"))]
pub use validate::{FakeValidator, ValidateCall};
