// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event routing and the in-memory diagnostic trail
//!
//! - `EventBus` - Route events to subscribers by name pattern
//! - `EventLog` - Bounded trail of recent events (retries, timeouts, cleanup failures)
//! - `EventPattern` - Glob matching over `:`-separated event names

mod bus;
mod log;
mod subscription;

pub use bus::{EventBus, EventReceiver, EventSender};
pub use log::{EventLog, EventRecord};
pub use subscription::{EventPattern, SubscriberId, Subscription};
