// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Type-erased queue items
//!
//! Operations on one slot return different result types, so the queue
//! stores them behind [`Job`] and hands results back through each item's
//! own reply channel.

use chrono::Utc;
use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tether_core::{CancelContext, OperationError, OperationResult};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub(crate) type Erased = Box<dyn Any + Send>;

/// How an item left the queue
pub(crate) struct Settlement {
    pub slot: String,
    pub item_id: String,
    pub attempts: u32,
    pub duration: Duration,
}

pub(crate) trait Job<T>: Send {
    /// Spawn one attempt against `target`
    ///
    /// The attempt runs as its own task so a timed-out operation can be
    /// left to finish on its own while the queue moves on.
    fn start(&self, target: T, ctx: CancelContext) -> JoinHandle<Result<Erased, String>>;

    /// Deliver the final outcome to the caller
    fn settle(self: Box<Self>, outcome: Result<Erased, OperationError>, settlement: Settlement);
}

pub(crate) struct TypedJob<T, R, F> {
    // Shared with each attempt task, which calls it
    op: Arc<F>,
    reply: oneshot::Sender<OperationResult<R>>,
    _target: PhantomData<fn(T)>,
}

impl<T, R, F> TypedJob<T, R, F> {
    pub fn new(op: F, reply: oneshot::Sender<OperationResult<R>>) -> Self {
        Self {
            op: Arc::new(op),
            reply,
            _target: PhantomData,
        }
    }
}

impl<T, R, F, Fut, E> Job<T> for TypedJob<T, R, F>
where
    T: Send + 'static,
    F: Fn(T, CancelContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Send + 'static,
    E: Display + Send + 'static,
{
    fn start(&self, target: T, ctx: CancelContext) -> JoinHandle<Result<Erased, String>> {
        // The call happens inside the task, so a panic while building the
        // future is caught at the task boundary like one while polling it
        let op = Arc::clone(&self.op);
        tokio::spawn(async move {
            op(target, ctx)
                .await
                .map(|value| Box::new(value) as Erased)
                .map_err(|e| e.to_string())
        })
    }

    fn settle(self: Box<Self>, outcome: Result<Erased, OperationError>, settlement: Settlement) {
        let Settlement {
            slot,
            item_id,
            attempts,
            duration,
        } = settlement;

        let outcome = outcome.and_then(|value| {
            value
                .downcast::<R>()
                .map(|value| *value)
                .map_err(|_| OperationError::Failed {
                    slot,
                    item_id: item_id.clone(),
                    message: "result type mismatch".to_string(),
                })
        });

        // The caller may have dropped its future; nothing else to do then
        let _ = self.reply.send(OperationResult {
            item_id,
            outcome,
            duration,
            attempts,
            timestamp: Utc::now(),
        });
    }
}
