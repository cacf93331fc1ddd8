//! Convenient imports for cowmap.
//!
//! ```ignore
//! use cowmap::prelude::*;
//!
//! let map = MutexMap::new();
//! map.set("key", "value");
//! ```

// Main entry point
pub use crate::map::{CowMap, CowMapBuilder};

// Configuration and errors
pub use crate::config::{EngineKind, MapConfig};
pub use crate::error::{Error, Result};

// Engines and the operation contract
pub use cowmap_concurrency::{CasMap, MutexMap};
pub use cowmap_core::{ConcurrentMap, Snapshot};
