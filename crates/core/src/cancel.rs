// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cooperative cancellation handed to every queued operation
//!
//! The engine never aborts a running operation. It cancels the context on
//! timeout or `cancel_all` and stops waiting; an operation that never looks
//! at its context keeps running until it finishes on its own. Operations
//! should call [`CancelContext::check`] between steps and wrap long awaits
//! in [`CancelContext::run_until_cancelled`].

use std::future::Future;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Returned by [`CancelContext::check`] once cancellation was requested
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Cancellation signal for one operation attempt
#[derive(Clone, Debug, Default)]
pub struct CancelContext {
    token: CancellationToken,
}

impl CancelContext {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Checkpoint for loop iterations and between await points
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.token.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolves once cancellation is requested
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Drive `fut` unless cancellation wins the race
    pub async fn run_until_cancelled<F>(&self, fut: F) -> Result<F::Output, Cancelled>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Cancelled),
            out = fut => Ok(out),
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl From<CancellationToken> for CancelContext {
    fn from(token: CancellationToken) -> Self {
        Self::new(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn check_reports_cancellation() {
        let token = CancellationToken::new();
        let ctx = CancelContext::new(token.clone());
        assert_eq!(ctx.check(), Ok(()));
        token.cancel();
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.check(), Err(Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn run_until_cancelled_stops_waiting() {
        let token = CancellationToken::new();
        let ctx = CancelContext::new(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let out = ctx
            .run_until_cancelled(tokio::time::sleep(Duration::from_secs(60)))
            .await;
        assert_eq!(out, Err(Cancelled));
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn run_until_cancelled_returns_output() {
        let ctx = CancelContext::default();
        let out = ctx.run_until_cancelled(async { 7 }).await;
        assert_eq!(out, Ok(7));
    }
}
