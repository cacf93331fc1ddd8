//! # cowmap
//!
//! Copy-on-write concurrent maps for read-heavy workloads.
//!
//! Every map keeps one immutable snapshot of its contents in an atomic
//! cell. Reads load that snapshot and never wait. Writes copy the whole
//! snapshot, change the copy, and publish it. Two engines differ only in
//! how they keep concurrent writers from losing each other's work:
//!
//! - [`CasMap`] - lock-free; a writer that loses the publication race
//!   copies again and retries
//! - [`MutexMap`] - writers take turns under one lock; a single attempt each
//!
//! Both implement [`ConcurrentMap`]. [`CowMap`] picks one at runtime from
//! a [`MapConfig`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use cowmap::prelude::*;
//!
//! let map = CasMap::new();
//! map.set("a", 1);
//!
//! assert_eq!(map.get_or_set("a", 5), (1, true));
//! assert!(map.compare_and_swap(&"a", &1, 2));
//! assert_eq!(map.get(&"a"), Some(2));
//! ```
//!
//! ## When not to use it
//!
//! Every write copies the full map, so write cost grows with map size.
//! These maps suit small-to-medium maps that are read far more often than
//! written.

#![warn(missing_docs)]

mod config;
mod error;
mod map;

pub mod prelude;

// Re-export main entry points
pub use config::{EngineKind, MapConfig, MAX_CAPACITY_HINT};
pub use error::{Error, Result};
pub use map::{CowMap, CowMapBuilder};

// Re-export engines and the shared contract
pub use cowmap_concurrency::{CasMap, MutexMap};
pub use cowmap_core::{ConcurrentMap, Snapshot};
