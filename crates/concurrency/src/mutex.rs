//! Lock-serialized copy-on-write map
//!
//! Readers load the published snapshot exactly as in [`crate::CasMap`].
//! Writers take one writer lock for the whole load-copy-publish sequence:
//!
//! ```text
//! 1. Acquire writer lock
//! 2. current = load()
//! 3. next = copy of current + change   - O(n) full copy
//! 4. store(next)                       - unconditional, no compare needed
//! 5. Release writer lock
//! ```
//!
//! Since every writer holds the lock from step 2 to step 4, nothing can
//! publish between the load and the store, and each write is a single
//! attempt. The lock never guards readers.

use arc_swap::ArcSwap;
use cowmap_core::{ConcurrentMap, Snapshot};
use parking_lot::Mutex;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

/// Copy-on-write map with writers serialized by a lock
///
/// Same contract as [`crate::CasMap`]. Trades the unbounded retries of the
/// CAS engine for writers waiting on each other; better when writes are
/// not rare but still far outnumbered by reads.
///
/// # Thread Safety
///
/// - Reads: one atomic load, never touch the writer lock
/// - Writes: exclusive among writers, single attempt
/// - Lock fairness is whatever `parking_lot::Mutex` provides
pub struct MutexMap<K, V> {
    /// Currently published snapshot
    data: ArcSwap<Snapshot<K, V>>,

    /// Writer serialization lock
    ///
    /// Held from loading the current snapshot until the copy is stored, so
    /// check-then-act operations (`get_or_set`, `set_if_absent`,
    /// `compare_and_swap`) are atomic with respect to other writers.
    write_lock: Mutex<()>,
}

impl<K, V> MutexMap<K, V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self::from_snapshot(Snapshot::new())
    }

    /// Create an empty map whose first snapshot is pre-sized
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_snapshot(Snapshot::with_capacity(capacity))
    }

    fn from_snapshot(snapshot: Snapshot<K, V>) -> Self {
        Self {
            data: ArcSwap::from_pointee(snapshot),
            write_lock: Mutex::new(()),
        }
    }
}

impl<K, V> ConcurrentMap<K, V> for MutexMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    #[inline]
    fn get(&self, key: &K) -> Option<V> {
        self.data.load().get(key).cloned()
    }

    fn set(&self, key: K, value: V) {
        let _guard = self.write_lock.lock();
        let next = self.data.load().with_entry(key, value);
        self.data.store(Arc::new(next));
    }

    fn delete(&self, key: &K) {
        let _guard = self.write_lock.lock();
        let current = self.data.load();
        if !current.contains_key(key) {
            return;
        }
        let next = current.without(key);
        self.data.store(Arc::new(next));
    }

    #[inline]
    fn len(&self) -> usize {
        self.data.load().len()
    }

    #[inline]
    fn has(&self, key: &K) -> bool {
        self.data.load().contains_key(key)
    }

    fn clear(&self) {
        let _guard = self.write_lock.lock();
        self.data.store(Arc::new(Snapshot::new()));
        debug!("cleared mutex map");
    }

    fn range<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        // No lock is held here, so `f` may write to this map.
        let snapshot = self.data.load_full();
        for (key, value) in snapshot.iter() {
            if !f(key, value) {
                break;
            }
        }
    }

    fn keys(&self) -> Vec<K> {
        self.data.load().keys().cloned().collect()
    }

    fn values(&self) -> Vec<V> {
        self.data.load().values().cloned().collect()
    }

    fn get_or_set(&self, key: K, value: V) -> (V, bool) {
        if let Some(existing) = self.data.load().get(&key) {
            return (existing.clone(), true);
        }

        let _guard = self.write_lock.lock();
        let current = self.data.load();
        // Another writer may have installed it while we waited for the lock.
        if let Some(existing) = current.get(&key) {
            return (existing.clone(), true);
        }
        let next = current.with_entry(key, value.clone());
        self.data.store(Arc::new(next));
        (value, false)
    }

    fn set_if_absent(&self, key: K, value: V) -> bool {
        let _guard = self.write_lock.lock();
        let current = self.data.load();
        if current.contains_key(&key) {
            return false;
        }
        let next = current.with_entry(key, value);
        self.data.store(Arc::new(next));
        true
    }

    fn compare_and_swap(&self, key: &K, old: &V, new: V) -> bool
    where
        V: PartialEq,
    {
        let _guard = self.write_lock.lock();
        let current = self.data.load();
        match current.get(key) {
            Some(value) if value == old => {}
            _ => return false,
        }
        let next = current.with_entry(key.clone(), new);
        self.data.store(Arc::new(next));
        true
    }

    fn snapshot(&self) -> Arc<Snapshot<K, V>> {
        self.data.load_full()
    }
}

impl<K, V> Default for MutexMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for MutexMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_snapshot(iter.into_iter().collect())
    }
}

impl<K, V> fmt::Debug for MutexMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutexMap")
            .field("len", &self.data.load().len())
            .field("write_locked", &self.write_lock.is_locked())
            .finish()
    }
}
