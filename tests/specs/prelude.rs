//! Shared helpers for engine specs

pub use std::sync::atomic::{AtomicU32, Ordering};
pub use std::sync::{Arc, Mutex};
pub use std::time::Duration;
pub use tether_core::{
    CancelContext, EngineConfig, OperationOptions, RecoveryStrategy, RefError, SequentialIdGen,
    SystemClock,
};
pub use tether_engine::{RefEngine, SlotDefinition};

/// Handles are plain strings in specs
pub type Engine = RefEngine<String, SystemClock, SequentialIdGen>;

pub fn engine() -> Engine {
    RefEngine::with_parts(EngineConfig::default(), SystemClock, SequentialIdGen::default())
}

pub fn handle(name: &str) -> String {
    name.to_string()
}

/// Shared record of what ran, in order
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}
