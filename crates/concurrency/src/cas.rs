//! Lock-free copy-on-write map
//!
//! Every write runs the same round until it wins:
//!
//! ```text
//! 1. current = load()                  - guard on the published snapshot
//! 2. decide from current               - may finish here without writing
//! 3. next = copy of current + change   - O(n) full copy
//! 4. compare_and_swap(current, next)   - publish iff cell still holds current
//! 5. IF another writer published first: go to 1
//! ```
//!
//! The identity compared in step 4 is the `Arc` loaded in step 1 of the
//! same round. The guard from step 1 keeps that snapshot alive until the
//! compare completes, so its address cannot be freed and reused by a
//! newer snapshot in between (no ABA).
//!
//! ## Progress
//!
//! Writers never block, but a round that loses the race is repeated with no
//! bound and no backoff. Under sustained write contention on a large map
//! every lost round is another full copy. [`CasMap::contention_retries`]
//! exposes how often that happens. Prefer [`crate::MutexMap`] when writes
//! are frequent.

use arc_swap::{ArcSwap, Guard};
use cowmap_core::{ConcurrentMap, Snapshot};
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Copy-on-write map published with compare-and-swap
///
/// # Thread Safety
///
/// All operations take `&self`. Share with `Arc<CasMap<K, V>>`.
/// - Reads: one atomic load, never wait
/// - Writes: optimistic, retried until the publication wins
///
/// # Example
///
/// ```ignore
/// use cowmap_concurrency::{CasMap, ConcurrentMap};
///
/// let map = CasMap::new();
/// map.set("a", 1);
/// assert!(map.compare_and_swap(&"a", &1, 2));
/// assert_eq!(map.get(&"a"), Some(2));
/// ```
pub struct CasMap<K, V> {
    /// Currently published snapshot
    data: ArcSwap<Snapshot<K, V>>,

    /// Lost publication races since construction
    retries: AtomicU64,
}

impl<K, V> CasMap<K, V> {
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
            retries: AtomicU64::new(0),
        }
    }

    /// Number of write rounds that lost the publication race and retried
    ///
    /// Cumulative since construction. A value growing faster than the
    /// write rate means writers are repeatedly copying the map for nothing.
    pub fn contention_retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    /// Try to replace `current` with `next`
    ///
    /// Returns `false` if another writer published since `current` was
    /// loaded; `next` is dropped and the caller starts a new round.
    /// `attempt` is the caller's round number, starting at 1.
    fn publish(
        &self,
        current: &Guard<Arc<Snapshot<K, V>>>,
        next: Snapshot<K, V>,
        attempt: u64,
    ) -> bool {
        let prev = self.data.compare_and_swap(current, Arc::new(next));
        if Arc::ptr_eq(&**current, &*prev) {
            return true;
        }

        self.retries.fetch_add(1, Ordering::Relaxed);
        trace!(
            attempt,
            len = current.len(),
            "lost snapshot publication race, retrying"
        );
        false
    }
}

impl<K, V> ConcurrentMap<K, V> for CasMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    #[inline]
    fn get(&self, key: &K) -> Option<V> {
        self.data.load().get(key).cloned()
    }

    fn set(&self, key: K, value: V) {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = self.data.load();
            let next = current.with_entry(key.clone(), value.clone());
            if self.publish(&current, next, attempt) {
                return;
            }
        }
    }

    fn delete(&self, key: &K) {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = self.data.load();
            if !current.contains_key(key) {
                return;
            }
            let next = current.without(key);
            if self.publish(&current, next, attempt) {
                return;
            }
        }
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
        // Last writer wins; writes racing with clear may land before or after it.
        self.data.store(Arc::new(Snapshot::new()));
        debug!("cleared cas map");
    }

    fn range<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        // Owned handle: the visitor may run long and may write to this map.
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

        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = self.data.load();
            // Another writer may have installed it since the fast path.
            if let Some(existing) = current.get(&key) {
                return (existing.clone(), true);
            }
            let next = current.with_entry(key.clone(), value.clone());
            if self.publish(&current, next, attempt) {
                return (value, false);
            }
        }
    }

    fn set_if_absent(&self, key: K, value: V) -> bool {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = self.data.load();
            if current.contains_key(&key) {
                return false;
            }
            let next = current.with_entry(key.clone(), value.clone());
            if self.publish(&current, next, attempt) {
                return true;
            }
        }
    }

    fn compare_and_swap(&self, key: &K, old: &V, new: V) -> bool
    where
        V: PartialEq,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = self.data.load();
            match current.get(key) {
                Some(value) if value == old => {}
                _ => return false,
            }
            let next = current.with_entry(key.clone(), new.clone());
            if self.publish(&current, next, attempt) {
                return true;
            }
        }
    }

    fn snapshot(&self) -> Arc<Snapshot<K, V>> {
        self.data.load_full()
    }
}

impl<K, V> Default for CasMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for CasMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_snapshot(iter.into_iter().collect())
    }
}

impl<K, V> fmt::Debug for CasMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CasMap")
            .field("len", &self.data.load().len())
            .field("contention_retries", &self.contention_retries())
            .finish()
    }
}
