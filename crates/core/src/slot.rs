// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reference slot: a named binding cell for one externally owned handle
//!
//! Two observable states, `Unbound` and `Bound`. `bind` is the only way in
//! (or to replace), `unbind` the only way out. A rejected candidate leaves
//! the slot as it was unless the binder's strategy supplies a fallback.
//! Transitions return the events they produced, for the owner to publish.

use crate::error::{CleanupError, RefError};
use crate::event::Event;
use crate::hooks::{Cleanup, Validator};
use crate::recovery::RecoveryStrategy;
use crate::wait::WaitForBind;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Metadata key holding the most recent cleanup failure
pub const CLEANUP_ERROR_KEY: &str = "cleanup.last_error";

/// Result of an accepted bind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    /// The fallback was bound instead of the candidate
    pub fallback: bool,
    /// A previous target was cleaned up and replaced
    pub replaced: bool,
    /// Waiters resolved by this bind
    pub resolved: usize,
}

/// Diagnostic view of a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotInfo {
    pub name: String,
    pub bound: bool,
    pub binds: u64,
    pub pending_waiters: usize,
    pub metadata: BTreeMap<String, String>,
    pub last_error: Option<String>,
    pub cleanup_failures: u64,
}

/// A value cleared for binding: the candidate, or a fallback in its place
pub struct Admitted<T> {
    value: T,
    rejection: Option<String>,
}

impl<T> Admitted<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn is_fallback(&self) -> bool {
        self.rejection.is_some()
    }
}

/// Run `candidate` past `validator`, falling back per `strategy`
///
/// `Err` carries the rejection reason when the strategy has no fallback.
/// Fallback values are not validated again.
pub fn admit<T: Clone>(
    slot: &str,
    validator: Option<&dyn Validator<T>>,
    candidate: T,
    strategy: &RecoveryStrategy<T>,
) -> Result<Admitted<T>, String> {
    let Some(validator) = validator else {
        return Ok(Admitted {
            value: candidate,
            rejection: None,
        });
    };
    if validator.validate(&candidate) {
        return Ok(Admitted {
            value: candidate,
            rejection: None,
        });
    }
    let reason = format!("rejected by {}", validator.name());
    match strategy {
        RecoveryStrategy::Fallback(fallback) => {
            tracing::warn!(slot, %reason, "candidate rejected, binding fallback");
            Ok(Admitted {
                value: fallback.resolve(),
                rejection: Some(reason),
            })
        }
        RecoveryStrategy::Fail | RecoveryStrategy::Retry => Err(reason),
    }
}

/// A target taken out of its slot that has not been cleaned up yet
pub struct Detached<T> {
    target: T,
    cleanup: Option<Arc<dyn Cleanup<T>>>,
}

impl<T> Detached<T> {
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Run the slot's cleanup hook, if it has one
    pub fn release(&self) -> Result<(), CleanupError> {
        match &self.cleanup {
            Some(cleanup) => cleanup.cleanup(&self.target),
            None => Ok(()),
        }
    }
}

pub struct RefSlot<T> {
    name: String,
    target: Option<T>,
    validator: Option<Arc<dyn Validator<T>>>,
    cleanup: Option<Arc<dyn Cleanup<T>>>,
    waiters: VecDeque<oneshot::Sender<T>>,
    metadata: BTreeMap<String, String>,
    last_error: Option<String>,
    binds: u64,
    cleanup_failures: u64,
}

impl<T: Clone> RefSlot<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
            validator: None,
            cleanup: None,
            waiters: VecDeque::new(),
            metadata: BTreeMap::new(),
            last_error: None,
            binds: 0,
            cleanup_failures: 0,
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn Validator<T>>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_cleanup(mut self, cleanup: Arc<dyn Cleanup<T>>) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_bound(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Waiters still interested in the next bind
    pub fn pending_waiters(&self) -> usize {
        self.waiters.iter().filter(|tx| !tx.is_closed()).count()
    }

    /// The slot's validator, for checking a candidate away from the slot
    pub fn validator(&self) -> Option<Arc<dyn Validator<T>>> {
        self.validator.clone()
    }

    /// Bind `candidate`, applying `strategy` if the validator rejects it
    ///
    /// On acceptance the previous target is cleaned up (best effort), the
    /// new one stored, and every pending waiter resolved in registration
    /// order with the same value. Owners that share the slot between
    /// threads run the same steps through [`admit`], [`RefSlot::detach`]
    /// and [`RefSlot::attach`] so that hooks never run under their lock.
    pub fn bind(
        &mut self,
        candidate: T,
        strategy: &RecoveryStrategy<T>,
    ) -> (Result<Bound, RefError>, Vec<Event>) {
        let validator = self.validator.clone();
        let admitted = match admit(&self.name, validator.as_deref(), candidate, strategy) {
            Ok(admitted) => admitted,
            Err(reason) => {
                let (err, event) = self.reject(reason, strategy);
                return (Err(err), vec![event]);
            }
        };

        let mut events = Vec::new();
        let replaced = match self.detach() {
            Some(previous) => {
                if let Err(e) = previous.release() {
                    events.push(self.record_cleanup_failure(&e));
                }
                true
            }
            None => false,
        };
        let (bound, event) = self.attach(admitted, replaced);
        events.push(event);
        (Ok(bound), events)
    }

    /// Record a rejected candidate that had no fallback
    pub fn reject(&mut self, reason: String, strategy: &RecoveryStrategy<T>) -> (RefError, Event) {
        tracing::warn!(slot = %self.name, %reason, "candidate rejected");
        self.last_error = Some(reason.clone());
        let event = Event::SlotRejected {
            slot: self.name.clone(),
            reason: reason.clone(),
        };
        let err = RefError::ValidationFailed {
            slot: self.name.clone(),
            reason,
            retryable: matches!(strategy, RecoveryStrategy::Retry),
        };
        (err, event)
    }

    /// Take the current target out, still owing its cleanup
    pub fn detach(&mut self) -> Option<Detached<T>> {
        let target = self.target.take()?;
        Some(Detached {
            target,
            cleanup: self.cleanup.clone(),
        })
    }

    /// Store an admitted value and resolve every waiter with it
    pub fn attach(&mut self, admitted: Admitted<T>, replaced: bool) -> (Bound, Event) {
        let fallback = admitted.is_fallback();
        let Admitted { value, rejection } = admitted;

        self.target = Some(value.clone());
        self.binds += 1;
        // A fallback bind keeps the rejection reason around
        self.last_error = rejection;

        let resolved = self.resolve_waiters(&value);
        tracing::debug!(slot = %self.name, fallback, replaced, resolved, "bound");
        let event = Event::SlotBound {
            slot: self.name.clone(),
            fallback,
            replaced,
            waiters: resolved,
        };
        (
            Bound {
                fallback,
                replaced,
                resolved,
            },
            event,
        )
    }

    /// Count a failed cleanup against this slot
    pub fn record_cleanup_failure(&mut self, error: &CleanupError) -> Event {
        tracing::warn!(slot = %self.name, error = %error, "cleanup failed");
        self.cleanup_failures += 1;
        self.metadata
            .insert(CLEANUP_ERROR_KEY.to_string(), error.to_string());
        Event::SlotCleanupFailed {
            slot: self.name.clone(),
            error: error.to_string(),
        }
    }

    /// Clean up and clear the target. Waiters keep waiting.
    pub fn unbind(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(previous) = self.detach() {
            if let Err(e) = previous.release() {
                events.push(self.record_cleanup_failure(&e));
            }
            tracing::debug!(slot = %self.name, "unbound");
            events.push(Event::SlotUnbound {
                slot: self.name.clone(),
            });
        }
        events
    }

    /// Register interest in the next bind, or resolve at once if bound
    pub fn wait(&mut self) -> WaitForBind<T> {
        if let Some(target) = &self.target {
            return WaitForBind::ready(&self.name, target.clone());
        }
        self.waiters.retain(|tx| !tx.is_closed());
        let (tx, rx) = oneshot::channel();
        self.waiters.push_back(tx);
        WaitForBind::pending(&self.name, rx)
    }

    /// Reject every outstanding waiter with `WaitCancelled`
    pub fn cancel_waiters(&mut self) -> Vec<Event> {
        let count = self.pending_waiters();
        self.waiters.clear();
        if count == 0 {
            return Vec::new();
        }
        tracing::debug!(slot = %self.name, count, "waiters cancelled");
        vec![Event::SlotWaitersCancelled {
            slot: self.name.clone(),
            count,
        }]
    }

    pub fn info(&self) -> SlotInfo {
        SlotInfo {
            name: self.name.clone(),
            bound: self.is_bound(),
            binds: self.binds,
            pending_waiters: self.pending_waiters(),
            metadata: self.metadata.clone(),
            last_error: self.last_error.clone(),
            cleanup_failures: self.cleanup_failures,
        }
    }

    fn resolve_waiters(&mut self, target: &T) -> usize {
        let mut resolved = 0;
        for tx in self.waiters.drain(..) {
            // A waiter that gave up (dropped its future) is skipped
            if tx.send(target.clone()).is_ok() {
                resolved += 1;
            }
        }
        resolved
    }
}

impl<T> fmt::Debug for RefSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefSlot")
            .field("name", &self.name)
            .field("bound", &self.target.is_some())
            .field("waiters", &self.waiters.len())
            .field("binds", &self.binds)
            .finish()
    }
}

#[cfg(test)]
#[path = "slot_tests.rs"]
mod tests;
