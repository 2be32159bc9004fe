// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Where a queue finds the target for an operation when it starts

/// Looked up at the start of every attempt, never at enqueue time
pub trait TargetSource<T>: Send + Sync {
    fn current(&self) -> Option<T>;
}

impl<T, F> TargetSource<T> for F
where
    F: Fn() -> Option<T> + Send + Sync,
{
    fn current(&self) -> Option<T> {
        self()
    }
}
