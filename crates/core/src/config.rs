// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration
//!
//! Loaded from TOML with human-readable durations:
//!
//! ```toml
//! default_timeout = "2s"
//! default_retries = 1
//! mount_timeout = "500ms"
//! strict_slots = true
//! event_log_capacity = 512
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Timeout for operations that do not set one
    #[serde(with = "humantime_serde")]
    pub default_timeout: Option<Duration>,
    /// Retries for operations that do not set them
    pub default_retries: u32,
    /// Bound used by the `*_bounded` wait helpers
    #[serde(with = "humantime_serde")]
    pub mount_timeout: Option<Duration>,
    /// Refuse names that were never defined instead of creating them lazily
    pub strict_slots: bool,
    /// Number of recent events kept for diagnostics
    pub event_log_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_timeout: None,
            default_retries: 0,
            mount_timeout: None,
            strict_slots: false,
            event_log_capacity: 256,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&source)
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    pub fn with_default_retries(mut self, retries: u32) -> Self {
        self.default_retries = retries;
        self
    }

    pub fn with_mount_timeout(mut self, timeout: Duration) -> Self {
        self.mount_timeout = Some(timeout);
        self
    }

    pub fn with_strict_slots(mut self, strict: bool) -> Self {
        self.strict_slots = strict;
        self
    }

    pub fn with_event_log_capacity(mut self, capacity: usize) -> Self {
        self.event_log_capacity = capacity;
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
