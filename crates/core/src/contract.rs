//! The operation contract shared by every engine
//!
//! Both engines publish immutable [`Snapshot`]s through a single cell and
//! differ only in how writers make that publication safe. This trait names
//! the operations they have in common so callers can be written once and
//! handed either engine.
//!
//! ## Semantics common to all implementations
//!
//! - Reads (`get`, `has`, `len`, `range`, `keys`, `values`, `snapshot`)
//!   load the current snapshot and never wait on a writer.
//! - Every write that changes the map publishes a complete new snapshot.
//!   Writes that change nothing (`delete` of an absent key, a failed
//!   `set_if_absent` or `compare_and_swap`) publish nothing.
//! - Compound operations (`get_or_set`, `set_if_absent`,
//!   `compare_and_swap`) check and publish atomically with respect to other
//!   writers on the same map.
//! - There is no cross-key consistency beyond "every read sees exactly one
//!   published snapshot".

use crate::snapshot::Snapshot;
use std::hash::Hash;
use std::sync::Arc;

/// Concurrent copy-on-write map operations
pub trait ConcurrentMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Get the value stored under `key` in the current snapshot
    fn get(&self, key: &K) -> Option<V>;

    /// Insert or replace `key -> value`
    fn set(&self, key: K, value: V);

    /// Remove `key`; no-op (and no copy) if it is absent
    fn delete(&self, key: &K);

    /// Number of entries in the current snapshot
    fn len(&self) -> usize;

    /// Check if the current snapshot is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if `key` is present in the current snapshot
    fn has(&self, key: &K) -> bool;

    /// Replace the whole map with an empty snapshot
    fn clear(&self);

    /// Visit every entry of one snapshot until `f` returns `false`
    ///
    /// The snapshot is fixed when the call starts. `f` may write to the
    /// same map; those writes publish new snapshots and do not affect the
    /// iteration in progress.
    fn range<F>(&self, f: F)
    where
        F: FnMut(&K, &V) -> bool;

    /// All keys of one snapshot, in unspecified order
    fn keys(&self) -> Vec<K>;

    /// All values of one snapshot, in unspecified order
    fn values(&self) -> Vec<V>;

    /// Return the existing value for `key`, or install `value`
    ///
    /// Returns `(existing, true)` if the key was present, `(value, false)`
    /// if this call installed it. Among concurrent callers racing on an
    /// absent key exactly one observes `false`.
    fn get_or_set(&self, key: K, value: V) -> (V, bool);

    /// Install `key -> value` only if `key` is absent
    ///
    /// Returns `true` if this call installed the value.
    fn set_if_absent(&self, key: K, value: V) -> bool;

    /// Replace the value under `key` with `new` if it currently equals `old`
    ///
    /// Returns `false` if the key is absent or holds a different value.
    fn compare_and_swap(&self, key: &K, old: &V, new: V) -> bool
    where
        V: PartialEq;

    /// Handle to the current snapshot
    ///
    /// The handle keeps that snapshot alive and unchanged; use it to run
    /// several reads against one consistent view.
    fn snapshot(&self) -> Arc<Snapshot<K, V>>;
}
