//! Behavioral specifications for the tether engine.
//!
//! These tests are black-box: they drive a `RefEngine` through its public
//! API only and check what callers can observe (results, stats, events).

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// slot/
#[path = "specs/slot/binding.rs"]
mod slot_binding;
#[path = "specs/slot/waiting.rs"]
mod slot_waiting;

// queue/
#[path = "specs/queue/ordering.rs"]
mod queue_ordering;
#[path = "specs/queue/resilience.rs"]
mod queue_resilience;
