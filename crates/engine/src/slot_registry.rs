// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named reference slots and multi-slot waits
//!
//! Slots are created on first reference from their definition (or an empty
//! one when lenient). Hooks are wrapped with tracing at creation. Events
//! produced by a transition are published after the registry lock is
//! released.
//!
//! Validators, cleanups and fallback producers run without the registry
//! lock, so a hook may read the registry. Transitions of one slot are
//! serialized by that slot's gate instead; a hook must not bind, unbind or
//! remove its own slot.

use crate::target::TargetSource;
use futures::future::{try_join_all, BoxFuture};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tether_adapters::{TracedCleanup, TracedValidator};
use tether_core::{
    admit, Bound, Cleanup, Detached, Event, EventBus, RecoveryStrategy, RefError, RefSlot,
    SlotInfo, Validator, WaitForBind,
};

/// Declarative description of a slot: hooks plus initial metadata
pub struct SlotDefinition<T> {
    validator: Option<Arc<dyn Validator<T>>>,
    cleanup: Option<Arc<dyn Cleanup<T>>>,
    metadata: BTreeMap<String, String>,
}

impl<T> SlotDefinition<T> {
    pub fn new() -> Self {
        Self {
            validator: None,
            cleanup: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_validator(mut self, validator: impl Validator<T> + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_cleanup(mut self, cleanup: impl Cleanup<T> + 'static) -> Self {
        self.cleanup = Some(Arc::new(cleanup));
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl<T> Default for SlotDefinition<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SlotDefinition<T> {
    fn clone(&self) -> Self {
        Self {
            validator: self.validator.clone(),
            cleanup: self.cleanup.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

impl<T> fmt::Debug for SlotDefinition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotDefinition")
            .field("validator", &self.validator.as_ref().map(|v| v.name().to_string()))
            .field("cleanup", &self.cleanup.as_ref().map(|c| c.name().to_string()))
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Serializes the transitions of one slot name
type Gate = Arc<Mutex<()>>;

struct Slots<T> {
    by_name: BTreeMap<String, RefSlot<T>>,
    definitions: HashMap<String, SlotDefinition<T>>,
    // Outlive removal, so a bind racing a remove waits its turn
    gates: HashMap<String, Gate>,
}

/// Owner of every reference slot in a session
pub struct SlotRegistry<T> {
    events: EventBus,
    strict: bool,
    slots: Mutex<Slots<T>>,
}

impl<T> SlotRegistry<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(events: EventBus) -> Self {
        Self {
            events,
            strict: false,
            slots: Mutex::new(Slots {
                by_name: BTreeMap::new(),
                definitions: HashMap::new(),
                gates: HashMap::new(),
            }),
        }
    }

    /// Refuse names that were never defined instead of creating them
    pub fn with_strict_slots(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Slots<T>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a definition used when `name` is first referenced
    ///
    /// A slot that already exists keeps the hooks it was created with.
    pub fn define(&self, name: impl Into<String>, definition: SlotDefinition<T>) {
        let name = name.into();
        let mut slots = self.lock();
        if slots.by_name.contains_key(&name) {
            tracing::debug!(slot = %name, "slot exists, definition applies after removal");
        }
        slots.definitions.insert(name, definition);
    }

    /// Diagnostic view of `name`, creating the slot from `definition` if new
    pub fn get_or_create(&self, name: &str, definition: SlotDefinition<T>) -> SlotInfo {
        let mut slots = self.lock();
        if let Some(slot) = slots.by_name.get(name) {
            return slot.info();
        }
        let slot = create(name, &definition);
        let info = slot.info();
        slots.definitions.insert(name.to_string(), definition);
        slots.by_name.insert(name.to_string(), slot);
        info
    }

    /// Bind `candidate` into `name`, resolving its waiters
    pub fn bind(
        &self,
        name: &str,
        candidate: T,
        strategy: &RecoveryStrategy<T>,
    ) -> Result<Bound, RefError> {
        let span = tracing::debug_span!("slot.bind", slot = name);
        let _guard = span.enter();

        let gate = self.gate(name, true)?;
        let _turn = enter(&gate);

        let validator = self.with_slot(name, |slot| slot.validator())?;
        let admitted = match admit(name, validator.as_deref(), candidate, strategy) {
            Ok(admitted) => admitted,
            Err(reason) => {
                let (err, event) = self.with_slot(name, |slot| slot.reject(reason, strategy))?;
                self.events.publish(event);
                return Err(err);
            }
        };

        let mut events = Vec::new();
        let replaced = match self.with_slot(name, RefSlot::detach)? {
            Some(previous) => {
                self.release(name, previous, &mut events);
                true
            }
            None => false,
        };
        let (bound, event) = self.with_slot(name, |slot| slot.attach(admitted, replaced))?;
        events.push(event);
        self.events.publish_all(events);
        Ok(bound)
    }

    /// Clean up and clear the target of an existing slot
    pub fn unbind(&self, name: &str) -> Result<(), RefError> {
        let span = tracing::debug_span!("slot.unbind", slot = name);
        let _guard = span.enter();

        let gate = self.gate(name, false)?;
        let _turn = enter(&gate);

        let Some(previous) = self.lock().by_name.get_mut(name).and_then(RefSlot::detach) else {
            return Ok(());
        };
        let mut events = Vec::new();
        self.release(name, previous, &mut events);
        tracing::debug!(slot = name, "unbound");
        events.push(Event::SlotUnbound {
            slot: name.to_string(),
        });
        self.events.publish_all(events);
        Ok(())
    }

    /// Create `name` if it is new; strict registries require a definition
    pub fn ensure(&self, name: &str) -> Result<(), RefError> {
        let mut slots = self.lock();
        self.slot_mut(&mut slots, name).map(|_| ())
    }

    /// Future for the next bind of `name`, ready at once if already bound
    pub fn wait_for_bind(&self, name: &str) -> Result<WaitForBind<T>, RefError> {
        let mut slots = self.lock();
        let slot = self.slot_mut(&mut slots, name)?;
        Ok(slot.wait())
    }

    /// Wait until every slot in `names` is bound
    ///
    /// All waits are registered before this returns, so a bind that happens
    /// before the future is first polled still resolves it. Names already
    /// bound resolve on the first poll.
    pub fn wait_for_all<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<BoxFuture<'static, Result<BTreeMap<String, T>, RefError>>, RefError> {
        let waits = {
            let mut slots = self.lock();
            names
                .iter()
                .map(|name| Ok(self.slot_mut(&mut slots, name.as_ref())?.wait()))
                .collect::<Result<Vec<_>, RefError>>()?
        };
        let keys: Vec<String> = waits.iter().map(|w| w.slot().to_string()).collect();

        Ok(Box::pin(async move {
            let values = try_join_all(waits).await?;
            Ok(keys.into_iter().zip(values).collect())
        }))
    }

    /// Currently bound value of every known slot
    pub fn snapshot(&self) -> BTreeMap<String, Option<T>> {
        self.lock()
            .by_name
            .iter()
            .map(|(name, slot)| (name.clone(), slot.target().cloned()))
            .collect()
    }

    pub fn current(&self, name: &str) -> Option<T> {
        self.lock().by_name.get(name)?.target().cloned()
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.lock().by_name.get(name).is_some_and(RefSlot::is_bound)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().by_name.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.lock().by_name.keys().cloned().collect()
    }

    pub fn slot_info(&self, name: &str) -> Option<SlotInfo> {
        self.lock().by_name.get(name).map(RefSlot::info)
    }

    pub fn set_metadata(
        &self,
        name: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), RefError> {
        let mut slots = self.lock();
        let slot = self.slot_mut(&mut slots, name)?;
        slot.set_metadata(key, value);
        Ok(())
    }

    /// Reject everyone waiting on `name` with `WaitCancelled`
    pub fn cancel_waiters(&self, name: &str) -> usize {
        let events = match self.lock().by_name.get_mut(name) {
            Some(slot) => slot.cancel_waiters(),
            None => return 0,
        };
        let count = cancelled_count(&events);
        self.events.publish_all(events);
        count
    }

    /// Drop a slot: clean up its target and reject its waiters
    ///
    /// The definition is kept, so the next reference recreates the slot.
    pub fn remove(&self, name: &str) -> bool {
        let Ok(gate) = self.gate(name, false) else {
            return false;
        };
        let _turn = enter(&gate);

        let Some(mut slot) = self.lock().by_name.remove(name) else {
            return false;
        };
        let mut events = slot.unbind();
        events.extend(slot.cancel_waiters());
        self.events.publish_all(events);
        tracing::debug!(slot = name, "removed");
        true
    }

    /// Release every slot and forget them all, definitions included
    pub fn teardown(&self) -> usize {
        let names: Vec<String> = {
            let mut slots = self.lock();
            slots.definitions.clear();
            slots.by_name.keys().cloned().collect()
        };
        let count = names.iter().filter(|name| self.remove(name)).count();
        tracing::info!(slots = count, "slot registry torn down");
        count
    }

    /// Gate of `name`, creating the slot first when `create` is set
    fn gate(&self, name: &str, create: bool) -> Result<Gate, RefError> {
        let mut slots = self.lock();
        if create {
            self.slot_mut(&mut slots, name)?;
        } else if !slots.by_name.contains_key(name) {
            return Err(RefError::SlotNotFound(name.to_string()));
        }
        Ok(Arc::clone(slots.gates.entry(name.to_string()).or_default()))
    }

    /// Run `f` on `name` under the registry lock; `f` must not call hooks
    fn with_slot<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut RefSlot<T>) -> R,
    ) -> Result<R, RefError> {
        let mut slots = self.lock();
        self.slot_mut(&mut slots, name).map(f)
    }

    /// Clean up a detached target outside the lock, recording any failure
    fn release(&self, name: &str, previous: Detached<T>, events: &mut Vec<Event>) {
        if let Err(e) = previous.release() {
            if let Some(slot) = self.lock().by_name.get_mut(name) {
                events.push(slot.record_cleanup_failure(&e));
            }
        }
    }

    /// Existing slot, or one created from its definition
    fn slot_mut<'a>(
        &self,
        slots: &'a mut Slots<T>,
        name: &str,
    ) -> Result<&'a mut RefSlot<T>, RefError> {
        if !slots.by_name.contains_key(name) {
            let slot = match slots.definitions.get(name) {
                Some(definition) => create(name, definition),
                None if self.strict => return Err(RefError::SlotNotFound(name.to_string())),
                None => RefSlot::new(name),
            };
            tracing::debug!(slot = name, "created slot");
            slots.by_name.insert(name.to_string(), slot);
        }
        slots
            .by_name
            .get_mut(name)
            .ok_or_else(|| RefError::SlotNotFound(name.to_string()))
    }
}

fn create<T>(name: &str, definition: &SlotDefinition<T>) -> RefSlot<T>
where
    T: Clone + Send + 'static,
{
    let mut slot = RefSlot::new(name).with_metadata(definition.metadata.clone());
    if let Some(validator) = &definition.validator {
        slot = slot.with_validator(Arc::new(TracedValidator::new(name, Arc::clone(validator))));
    }
    if let Some(cleanup) = &definition.cleanup {
        slot = slot.with_cleanup(Arc::new(TracedCleanup::new(name, Arc::clone(cleanup))));
    }
    slot
}

fn enter(gate: &Mutex<()>) -> MutexGuard<'_, ()> {
    gate.lock().unwrap_or_else(|e| e.into_inner())
}

fn cancelled_count(events: &[Event]) -> usize {
    events
        .iter()
        .map(|event| match event {
            Event::SlotWaitersCancelled { count, .. } => *count,
            _ => 0,
        })
        .sum()
}

/// Reads a slot's target when a queued operation starts
pub struct SlotTarget<T> {
    registry: Arc<SlotRegistry<T>>,
    name: String,
}

impl<T> SlotTarget<T> {
    pub fn new(registry: Arc<SlotRegistry<T>>, name: impl Into<String>) -> Self {
        Self {
            registry,
            name: name.into(),
        }
    }
}

impl<T> TargetSource<T> for SlotTarget<T>
where
    T: Clone + Send + 'static,
{
    fn current(&self) -> Option<T> {
        self.registry.current(&self.name)
    }
}

#[cfg(test)]
#[path = "slot_registry_tests.rs"]
mod tests;
