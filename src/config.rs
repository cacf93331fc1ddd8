//! Map configuration.
//!
//! [`MapConfig`] picks the engine and the initial capacity hint. It can be
//! built in code or loaded from TOML:
//!
//! ```toml
//! engine = "cas"
//! capacity = 1024
//! ```
//!
//! Both fields are optional and default to the mutex engine with no
//! pre-sizing.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest accepted capacity hint.
///
/// The hint pre-allocates the first snapshot, so an unchecked value from a
/// config file could allocate arbitrarily large tables up front.
pub const MAX_CAPACITY_HINT: usize = 1 << 24;

/// Which copy-on-write engine backs a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Lock-free writers publishing with compare-and-swap
    Cas,
    /// Writers serialized by a lock
    #[default]
    Mutex,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Cas => write!(f, "cas"),
            EngineKind::Mutex => write!(f, "mutex"),
        }
    }
}

/// Options for building a map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    /// Engine to build
    pub engine: EngineKind,
    /// Initial capacity hint; 0 means no pre-sizing
    pub capacity: usize,
}

impl MapConfig {
    /// Default configuration (mutex engine, no pre-sizing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine.
    pub fn engine(mut self, engine: EngineKind) -> Self {
        self.engine = engine;
        self
    }

    /// Set the capacity hint.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: MapConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is within bounds.
    pub fn validate(&self) -> Result<()> {
        if self.capacity > MAX_CAPACITY_HINT {
            return Err(Error::InvalidConfig(format!(
                "capacity hint {} exceeds maximum {}",
                self.capacity, MAX_CAPACITY_HINT
            )));
        }
        Ok(())
    }
}
