//! Core types for cowmap
//!
//! This crate defines what both copy-on-write engines share:
//! - [`Snapshot`]: an immutable, fully materialized key/value mapping
//! - [`ConcurrentMap`]: the operation contract every engine implements
//!
//! Engines live in `cowmap-concurrency`. Nothing here synchronizes; a
//! snapshot is never mutated after it is built, so sharing one across
//! threads only needs an `Arc`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod contract;
pub mod snapshot;

pub use contract::ConcurrentMap;
pub use snapshot::Snapshot;
