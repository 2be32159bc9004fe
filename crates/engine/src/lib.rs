// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Tether reference engine: operation queues, registries and the session
//! facade

mod job;
mod queue;
mod queue_registry;
mod refs;
mod slot_registry;
mod target;

pub use queue::{OperationQueue, PendingOperation};
pub use queue_registry::QueueRegistry;
pub use refs::RefEngine;
pub use slot_registry::{SlotDefinition, SlotRegistry, SlotTarget};
pub use target::TargetSource;
