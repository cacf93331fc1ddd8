//! Concurrency layer for cowmap
//!
//! This crate implements the two copy-on-write engines:
//! - [`CasMap`]: writers publish with compare-and-swap and retry on a lost
//!   race; no locks anywhere
//! - [`MutexMap`]: writers publish under one writer lock; single attempt
//!
//! Both keep the current [`Snapshot`] in an `ArcSwap` cell. Readers load it
//! without locking in either engine; the engines differ only in how
//! writers are kept from overwriting each other's publications.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cas;
pub mod mutex;

pub use cas::CasMap;
pub use mutex::MutexMap;

// Re-export the contract and snapshot from core for convenience
pub use cowmap_core::{ConcurrentMap, Snapshot};
