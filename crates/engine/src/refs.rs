// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session-scoped reference engine
//!
//! Ties a [`SlotRegistry`] and a [`QueueRegistry`] together under one
//! configuration and event bus. A slot and its queue share only the name;
//! queued operations look the target up in the slot registry when they
//! start. Construct one engine per session and call
//! [`RefEngine::teardown`] when the session ends.

use crate::queue::PendingOperation;
use crate::queue_registry::QueueRegistry;
use crate::slot_registry::{SlotDefinition, SlotRegistry, SlotTarget};
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tether_core::{
    millis, Bound, CancelContext, Clock, EngineConfig, EventBus, EventRecord, IdGen,
    OperationOptions, QueueStats, RecoveryStrategy, RefError, SlotInfo, SystemClock, UuidIdGen,
    WaitForBind,
};

pub struct RefEngine<T, C = SystemClock, I = UuidIdGen> {
    config: EngineConfig,
    events: EventBus,
    slots: Arc<SlotRegistry<T>>,
    queues: QueueRegistry<T, C, I>,
}

impl<T> RefEngine<T, SystemClock, UuidIdGen>
where
    T: Clone + Send + 'static,
{
    pub fn new(config: EngineConfig) -> Self {
        Self::with_parts(config, SystemClock, UuidIdGen)
    }
}

impl<T, C, I> RefEngine<T, C, I>
where
    T: Clone + Send + 'static,
    C: Clock,
    I: IdGen,
{
    pub fn with_parts(config: EngineConfig, clock: C, id_gen: I) -> Self {
        let events = EventBus::with_log_capacity(config.event_log_capacity);
        let slots = SlotRegistry::new(events.clone()).with_strict_slots(config.strict_slots);
        let queues = QueueRegistry::new(clock, id_gen, events.clone());
        Self {
            config,
            events,
            slots: Arc::new(slots),
            queues,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Bus carrying every slot and queue event of this session
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn recent_events(&self) -> Vec<EventRecord> {
        self.events.recent()
    }

    // -------------------------------------------------------------------------
    // Slots
    // -------------------------------------------------------------------------

    pub fn define(&self, name: impl Into<String>, definition: SlotDefinition<T>) {
        self.slots.define(name, definition);
    }

    pub fn get_or_create(&self, name: &str, definition: SlotDefinition<T>) -> SlotInfo {
        self.slots.get_or_create(name, definition)
    }

    /// Bind with the `Fail` strategy
    pub fn bind(&self, name: &str, handle: T) -> Result<Bound, RefError> {
        self.slots.bind(name, handle, &RecoveryStrategy::Fail)
    }

    pub fn bind_with(
        &self,
        name: &str,
        handle: T,
        strategy: &RecoveryStrategy<T>,
    ) -> Result<Bound, RefError> {
        self.slots.bind(name, handle, strategy)
    }

    /// Bind candidates from `producer` until one is accepted
    ///
    /// Makes at least one attempt. Only retryable rejections are retried;
    /// the last rejection is returned once `attempts` run out.
    pub fn bind_with_retry<P>(
        &self,
        name: &str,
        attempts: u32,
        mut producer: P,
    ) -> Result<Bound, RefError>
    where
        P: FnMut() -> T,
    {
        let attempts = attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.slots.bind(name, producer(), &RecoveryStrategy::Retry) {
                Err(RefError::ValidationFailed {
                    retryable: true,
                    ref reason,
                    ..
                }) if attempt < attempts => {
                    tracing::debug!(slot = name, attempt, %reason, "rebinding after rejection");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    pub fn unbind(&self, name: &str) -> Result<(), RefError> {
        self.slots.unbind(name)
    }

    /// Drop a slot, rejecting its waiters and pending operations
    pub fn remove(&self, name: &str) -> bool {
        self.queues.cancel_all(name);
        self.slots.remove(name)
    }

    pub fn cancel_waiters(&self, name: &str) -> usize {
        self.slots.cancel_waiters(name)
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.slots.is_bound(name)
    }

    pub fn current(&self, name: &str) -> Option<T> {
        self.slots.current(name)
    }

    pub fn snapshot(&self) -> BTreeMap<String, Option<T>> {
        self.slots.snapshot()
    }

    pub fn slot_info(&self, name: &str) -> Option<SlotInfo> {
        self.slots.slot_info(name)
    }

    pub fn set_metadata(
        &self,
        name: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), RefError> {
        self.slots.set_metadata(name, key, value)
    }

    // -------------------------------------------------------------------------
    // Waiting
    // -------------------------------------------------------------------------

    pub fn wait_for_bind(&self, name: &str) -> Result<WaitForBind<T>, RefError> {
        self.slots.wait_for_bind(name)
    }

    /// Like [`wait_for_bind`](Self::wait_for_bind), failing with
    /// `MountTimeout` if nothing binds within `limit`
    pub async fn wait_for_bind_timeout(&self, name: &str, limit: Duration) -> Result<T, RefError> {
        let wait = self.slots.wait_for_bind(name)?;
        match tokio::time::timeout(limit, wait).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(slot = name, waited_ms = millis(limit), "mount timed out");
                Err(RefError::MountTimeout {
                    slot: name.to_string(),
                    waited: limit,
                })
            }
        }
    }

    /// Wait bounded by the configured mount timeout, if any
    pub async fn wait_for_bind_bounded(&self, name: &str) -> Result<T, RefError> {
        match self.config.mount_timeout {
            Some(limit) => self.wait_for_bind_timeout(name, limit).await,
            None => self.slots.wait_for_bind(name)?.await,
        }
    }

    pub fn wait_for_all<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<BoxFuture<'static, Result<BTreeMap<String, T>, RefError>>, RefError> {
        self.slots.wait_for_all(names)
    }

    /// Wait for every name; on expiry the error names the first one still
    /// unbound
    pub async fn wait_for_all_timeout<S: AsRef<str>>(
        &self,
        names: &[S],
        limit: Duration,
    ) -> Result<BTreeMap<String, T>, RefError> {
        let all = self.slots.wait_for_all(names)?;
        match tokio::time::timeout(limit, all).await {
            Ok(result) => result,
            Err(_) => {
                let slot = names
                    .iter()
                    .map(AsRef::as_ref)
                    .find(|name| !self.slots.is_bound(name))
                    .unwrap_or_default()
                    .to_string();
                tracing::warn!(slot = %slot, waited_ms = millis(limit), "mount timed out");
                Err(RefError::MountTimeout {
                    slot,
                    waited: limit,
                })
            }
        }
    }

    pub async fn wait_for_all_bounded<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<BTreeMap<String, T>, RefError> {
        match self.config.mount_timeout {
            Some(limit) => self.wait_for_all_timeout(names, limit).await,
            None => self.slots.wait_for_all(names)?.await,
        }
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Queue `op` against whatever `name` is bound to when it starts
    ///
    /// Options left unset take the configured default timeout and retries.
    pub fn with_target<F, Fut, R, E>(
        &self,
        name: &str,
        op: F,
        options: OperationOptions,
    ) -> Result<PendingOperation<R>, RefError>
    where
        F: Fn(T, CancelContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: Send + 'static,
        E: Display + Send + 'static,
    {
        if self.queues.is_closed() {
            return Err(RefError::QueueClosed {
                slot: name.to_string(),
            });
        }
        self.slots.ensure(name)?;
        let options = OperationOptions {
            timeout: options.timeout.or(self.config.default_timeout),
            retries: options.retries.or(Some(self.config.default_retries)),
            ..options
        };
        let queue = self.queues.queue(name)?;
        let source = SlotTarget::new(Arc::clone(&self.slots), name);
        Ok(queue.enqueue(source, op, options)?)
    }

    pub fn cancel_all(&self, name: &str) -> usize {
        self.queues.cancel_all(name)
    }

    /// Cancel one operation that has not started yet
    pub fn cancel(&self, name: &str, item_id: &str) -> bool {
        self.queues
            .get(name)
            .is_some_and(|queue| queue.cancel(item_id))
    }

    pub fn stats(&self, name: &str) -> Option<QueueStats> {
        self.queues.stats_for(name)
    }

    pub fn all_stats(&self) -> BTreeMap<String, QueueStats> {
        self.queues.stats()
    }

    pub fn total_stats(&self) -> QueueStats {
        self.queues.aggregate()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// End the session
    ///
    /// Closes every queue, cleans up every bound target and rejects every
    /// waiter. Later `with_target` calls fail with `QueueClosed`.
    pub fn teardown(&self) {
        let cancelled = self.queues.shutdown_all();
        let slots = self.slots.teardown();
        tracing::info!(cancelled, slots, "engine torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.queues.is_closed()
    }
}

#[cfg(test)]
#[path = "refs_tests.rs"]
mod tests;
