// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-slot operation queue
//!
//! At most one operation runs at a time. Pending items are ordered by
//! priority (descending) then arrival; a single drain task per queue pops
//! them one by one and is restarted by the next enqueue once it has
//! emptied the list.
//!
//! ```text
//! enqueue ──► pending (priority, arrival)
//!               │
//!               ▼
//!         drain loop ──► cancelled? ──► skip
//!               │
//!               ├─► resolve target ──► spawn attempt ──► [timeout race]
//!               │
//!               ├─ Ok  ──► completed
//!               └─ Err ──► retries left? ──► requeue at back
//!                                   └─────► failed
//! ```
//!
//! Outcomes are reported through the [`OperationResult`] each caller
//! awaits; only enqueueing on a closed queue is an error at call time.

use crate::job::{Erased, Job, Settlement, TypedJob};
use crate::target::TargetSource;
use chrono::Utc;
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tether_core::{
    millis, CancelContext, CancellationToken, Clock, Event, EventBus, IdGen, OperationError,
    OperationOptions, OperationResult, PendingList, QueueError, QueueStats,
};
use tokio::sync::oneshot;
use tokio::task::JoinError;
use tracing::Instrument;

struct QueueItem<T> {
    id: String,
    priority: i32,
    retries_remaining: u32,
    timeout: Option<Duration>,
    /// Private to the item; a caller-supplied token is its parent
    token: CancellationToken,
    enqueued_at: Instant,
    attempts: u32,
    duration: Duration,
    source: Arc<dyn TargetSource<T>>,
    job: Box<dyn Job<T>>,
}

struct State<T> {
    pending: PendingList<QueueItem<T>>,
    draining: bool,
    /// Token of the item currently executing
    running: Option<CancellationToken>,
    closed: bool,
    stats: QueueStats,
}

struct Inner<T, C, I> {
    slot: String,
    clock: C,
    id_gen: I,
    events: EventBus,
    state: Mutex<State<T>>,
}

/// Serializes operations against one slot's target
///
/// Cloning yields another handle to the same queue.
pub struct OperationQueue<T, C, I> {
    inner: Arc<Inner<T, C, I>>,
}

impl<T, C, I> Clone for OperationQueue<T, C, I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, C, I> OperationQueue<T, C, I>
where
    T: Send + 'static,
    C: Clock,
    I: IdGen,
{
    pub fn new(slot: impl Into<String>, clock: C, id_gen: I, events: EventBus) -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: slot.into(),
                clock,
                id_gen,
                events,
                state: Mutex::new(State {
                    pending: PendingList::new(),
                    draining: false,
                    running: None,
                    closed: false,
                    stats: QueueStats::default(),
                }),
            }),
        }
    }

    pub fn slot(&self) -> &str {
        &self.inner.slot
    }

    /// Queue `op` to run against whatever `source` yields when it starts
    ///
    /// Must be called within a tokio runtime; the first enqueue on an idle
    /// queue spawns its drain task.
    pub fn enqueue<S, F, Fut, R, E>(
        &self,
        source: S,
        op: F,
        options: OperationOptions,
    ) -> Result<PendingOperation<R>, QueueError>
    where
        S: TargetSource<T> + 'static,
        F: Fn(T, CancelContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: Send + 'static,
        E: Display + Send + 'static,
    {
        let inner = &self.inner;
        let id = inner.id_gen.assign(options.id);
        let priority = options.priority;
        let (tx, rx) = oneshot::channel();

        let item = QueueItem {
            id: id.clone(),
            priority,
            retries_remaining: options.retries.unwrap_or(0),
            timeout: options.timeout,
            token: options
                .cancel
                .map(|parent| parent.child_token())
                .unwrap_or_default(),
            enqueued_at: inner.clock.now(),
            attempts: 0,
            duration: Duration::ZERO,
            source: Arc::new(source),
            job: Box::new(TypedJob::new(op, tx)),
        };

        let start = {
            let mut state = inner.lock();
            if state.closed {
                return Err(QueueError::Closed {
                    slot: inner.slot.clone(),
                });
            }
            state.pending.insert(priority, item);
            !std::mem::replace(&mut state.draining, true)
        };

        tracing::debug!(slot = %inner.slot, item_id = %id, priority, "enqueued");
        inner.events.publish(Event::QueueItemEnqueued {
            slot: inner.slot.clone(),
            item_id: id.clone(),
            priority,
        });

        if start {
            tokio::spawn(Arc::clone(inner).drain());
        }

        Ok(PendingOperation {
            slot: inner.slot.clone(),
            item_id: id,
            rx,
        })
    }

    /// Reject every item that has not started and empty the pending list
    ///
    /// The running item, if any, has its token cancelled and keeps running.
    pub fn cancel_all(&self) -> usize {
        let inner = &self.inner;
        let (drained, running) = {
            let mut state = inner.lock();
            let drained = state.pending.drain();
            for item in &drained {
                let waited = inner.clock.since(item.enqueued_at);
                state.stats.record_rejected(waited);
            }
            (drained, state.running.clone())
        };

        if let Some(token) = running {
            token.cancel();
        }

        let count = drained.len();
        for item in drained {
            item.token.cancel();
            inner.reject(item);
        }
        if count > 0 {
            tracing::info!(slot = %inner.slot, count, "cancelled pending operations");
        }
        count
    }

    /// Reject one item that has not started yet
    pub fn cancel(&self, item_id: &str) -> bool {
        let inner = &self.inner;
        let removed = {
            let mut state = inner.lock();
            let removed = state.pending.remove_first(|item| item.id == item_id);
            if let Some(item) = &removed {
                let waited = inner.clock.since(item.enqueued_at);
                state.stats.record_rejected(waited);
            }
            removed
        };

        match removed {
            Some(item) => {
                item.token.cancel();
                inner.reject(item);
                true
            }
            None => false,
        }
    }

    /// Cancel everything and refuse further enqueues
    pub fn shutdown(&self) -> usize {
        self.inner.lock().closed = true;
        let cancelled = self.cancel_all();
        tracing::info!(slot = %self.inner.slot, cancelled, "queue shut down");
        self.inner.events.publish(Event::QueueShutdown {
            slot: self.inner.slot.clone(),
            cancelled,
        });
        cancelled
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn stats(&self) -> QueueStats {
        let state = self.inner.lock();
        QueueStats {
            pending: state.pending.len(),
            processing: usize::from(state.running.is_some()),
            ..state.stats.clone()
        }
    }

    /// Ids of items waiting to run, in the order they will run
    pub fn pending_ids(&self) -> Vec<String> {
        self.inner
            .lock()
            .pending
            .iter()
            .map(|item| item.id.clone())
            .collect()
    }
}

/// What to do with an item after a failed attempt
enum AfterFailure<T> {
    Requeued,
    Settle(QueueItem<T>),
}

impl<T, C, I> Inner<T, C, I>
where
    T: Send + 'static,
    C: Clock,
    I: IdGen,
{
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn drain(self: Arc<Self>) {
        let span = tracing::debug_span!("queue.drain", slot = %self.slot);
        async move {
            while let Some(mut item) = self.next_item() {
                if item.token.is_cancelled() {
                    self.skip(item);
                    continue;
                }

                let attempt = item.attempts + 1;
                let span = tracing::debug_span!("queue.attempt", item_id = %item.id, attempt);
                let outcome = self.run_attempt(&mut item).instrument(span).await;

                match outcome {
                    Ok(value) => self.complete(item, value),
                    Err(error) => {
                        if let AfterFailure::Settle(item) = self.after_failure(item, &error) {
                            self.fail(item, error);
                        }
                    }
                }
            }
            tracing::trace!("drained");
        }
        .instrument(span)
        .await
    }

    /// Pop the next item, or release the draining flag when empty
    fn next_item(&self) -> Option<QueueItem<T>> {
        let mut state = self.lock();
        match state.pending.pop_front() {
            Some(item) => {
                state.running = Some(item.token.clone());
                Some(item)
            }
            None => {
                state.draining = false;
                state.running = None;
                None
            }
        }
    }

    async fn run_attempt(&self, item: &mut QueueItem<T>) -> Result<Erased, OperationError> {
        item.attempts += 1;
        self.events.publish(Event::QueueItemStarted {
            slot: self.slot.clone(),
            item_id: item.id.clone(),
            attempt: item.attempts,
        });

        let started = self.clock.now();
        let result = match item.source.current() {
            None => Err(OperationError::Unbound {
                slot: self.slot.clone(),
                item_id: item.id.clone(),
            }),
            Some(target) => {
                let attempt_token = item.token.child_token();
                let handle = item
                    .job
                    .start(target, CancelContext::new(attempt_token.clone()));

                match item.timeout {
                    None => {
                        let joined = handle.await;
                        self.classify(item, joined)
                    }
                    Some(limit) => match tokio::time::timeout(limit, handle).await {
                        Ok(joined) => self.classify(item, joined),
                        Err(_) => {
                            // Stop waiting; the attempt keeps its own task
                            attempt_token.cancel();
                            tracing::warn!(after_ms = millis(limit), "attempt timed out");
                            self.events.publish(Event::QueueItemTimeout {
                                slot: self.slot.clone(),
                                item_id: item.id.clone(),
                                attempt: item.attempts,
                                after_ms: millis(limit),
                            });
                            Err(OperationError::Timeout {
                                slot: self.slot.clone(),
                                item_id: item.id.clone(),
                                after: limit,
                            })
                        }
                    },
                }
            }
        };
        item.duration += self.clock.since(started);
        result
    }

    fn classify(
        &self,
        item: &QueueItem<T>,
        joined: Result<Result<Erased, String>, JoinError>,
    ) -> Result<Erased, OperationError> {
        let slot = self.slot.clone();
        let item_id = item.id.clone();
        match joined {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) if item.token.is_cancelled() => {
                Err(OperationError::Cancelled { slot, item_id })
            }
            Ok(Err(message)) => Err(OperationError::Failed {
                slot,
                item_id,
                message,
            }),
            Err(e) if e.is_panic() => Err(OperationError::Panicked { slot, item_id }),
            Err(_) => Err(OperationError::Cancelled { slot, item_id }),
        }
    }

    fn complete(&self, item: QueueItem<T>, value: Erased) {
        let waited = self.clock.since(item.enqueued_at);
        {
            let mut state = self.lock();
            state.running = None;
            state.stats.record_success(item.duration, waited);
        }

        tracing::debug!(
            item_id = %item.id,
            attempts = item.attempts,
            elapsed_ms = millis(item.duration),
            "completed"
        );
        self.events.publish(Event::QueueItemCompleted {
            slot: self.slot.clone(),
            item_id: item.id.clone(),
            attempts: item.attempts,
            duration_ms: millis(item.duration),
        });
        self.settle(item, Ok(value));
    }

    /// Requeue at the back if retries remain, otherwise hand the item back
    fn after_failure(&self, mut item: QueueItem<T>, error: &OperationError) -> AfterFailure<T> {
        let retryable = item.retries_remaining > 0
            && !item.token.is_cancelled()
            && !error.is_cancelled();
        if !retryable {
            return AfterFailure::Settle(item);
        }

        let id = item.id.clone();
        let attempt = item.attempts;
        item.retries_remaining -= 1;
        let retries_remaining = item.retries_remaining;
        {
            let mut state = self.lock();
            if state.closed {
                return AfterFailure::Settle(item);
            }
            state.running = None;
            state.stats.record_retry();
            state.pending.requeue(item.priority, item);
        }

        tracing::warn!(item_id = %id, attempt, retries_remaining, error = %error, "attempt failed, retrying");
        self.events.publish(Event::QueueItemRetry {
            slot: self.slot.clone(),
            item_id: id,
            attempt,
            retries_remaining,
            error: error.to_string(),
        });
        AfterFailure::Requeued
    }

    fn fail(&self, item: QueueItem<T>, error: OperationError) {
        let waited = self.clock.since(item.enqueued_at);
        {
            let mut state = self.lock();
            state.running = None;
            if error.is_cancelled() {
                state.stats.record_rejected(waited);
            } else {
                state.stats.record_failure(error.to_string(), waited);
            }
        }

        if error.is_cancelled() {
            tracing::debug!(item_id = %item.id, "cancelled while running");
            self.events.publish(Event::QueueItemCancelled {
                slot: self.slot.clone(),
                item_id: item.id.clone(),
            });
        } else {
            tracing::error!(item_id = %item.id, attempts = item.attempts, error = %error, "operation failed");
            self.events.publish(Event::QueueItemFailed {
                slot: self.slot.clone(),
                item_id: item.id.clone(),
                attempts: item.attempts,
                error: error.to_string(),
            });
        }
        self.settle(item, Err(error));
    }

    /// Item whose own token was cancelled before it started
    fn skip(&self, item: QueueItem<T>) {
        let waited = self.clock.since(item.enqueued_at);
        {
            let mut state = self.lock();
            state.running = None;
            state.stats.record_skipped(waited);
        }
        tracing::debug!(item_id = %item.id, "skipped cancelled item");
        self.reject(item);
    }

    /// Resolve a not-started item as cancelled; accounting is the caller's
    fn reject(&self, item: QueueItem<T>) {
        self.events.publish(Event::QueueItemCancelled {
            slot: self.slot.clone(),
            item_id: item.id.clone(),
        });
        let error = OperationError::Cancelled {
            slot: self.slot.clone(),
            item_id: item.id.clone(),
        };
        self.settle(item, Err(error));
    }

    fn settle(&self, item: QueueItem<T>, outcome: Result<Erased, OperationError>) {
        let settlement = Settlement {
            slot: self.slot.clone(),
            item_id: item.id,
            attempts: item.attempts,
            duration: item.duration,
        };
        item.job.settle(outcome, settlement);
    }
}

/// Future for one queued operation's result descriptor
///
/// If the queue is dropped before settling the item, resolves as cancelled.
pub struct PendingOperation<R> {
    slot: String,
    item_id: String,
    rx: oneshot::Receiver<OperationResult<R>>,
}

impl<R> PendingOperation<R> {
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }
}

impl<R> Future for PendingOperation<R> {
    type Output = OperationResult<R>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.rx).poll(cx).map(|res| {
            res.unwrap_or_else(|_| OperationResult {
                item_id: this.item_id.clone(),
                outcome: Err(OperationError::Cancelled {
                    slot: this.slot.clone(),
                    item_id: this.item_id.clone(),
                }),
                duration: Duration::ZERO,
                attempts: 0,
                timestamp: Utc::now(),
            })
        })
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
