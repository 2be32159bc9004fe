// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tether-core: building blocks for binding external handles to named slots
//!
//! This crate provides:
//! - The reference slot state machine (bind/unbind, waiters, validation, cleanup)
//! - The priority-ordered pending list used by operation queues
//! - Operation options, result descriptors and queue statistics
//! - Events, the event bus and the in-memory event trail
//! - Clock and id abstractions, configuration, error types

pub mod clock;
pub mod id;

pub mod cancel;
pub mod config;
pub mod error;
pub mod event;
pub mod events;
pub mod hooks;
pub mod operation;
pub mod pending;
pub mod recovery;
pub mod slot;
pub mod stats;
pub mod wait;

pub use cancel::{CancelContext, Cancelled};
pub use clock::{micros, millis, Clock, SystemClock};
pub use config::EngineConfig;
pub use error::{CleanupError, ConfigError, OperationError, QueueError, RefError};
pub use event::Event;
pub use events::{EventBus, EventPattern, EventRecord, Subscription};
pub use hooks::{Cleanup, Validator};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use operation::{OperationOptions, OperationResult};
pub use pending::PendingList;
pub use recovery::{Fallback, RecoveryStrategy};
pub use slot::{admit, Admitted, Bound, Detached, RefSlot, SlotInfo, CLEANUP_ERROR_KEY};
pub use stats::QueueStats;
pub use wait::WaitForBind;

pub use tokio_util::sync::CancellationToken;
