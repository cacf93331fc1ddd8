//! Immutable snapshots
//!
//! A [`Snapshot`] is one complete key/value mapping. Engines publish a new
//! snapshot on every successful write and never touch a published one
//! again, so a reader holding an `Arc<Snapshot>` sees the same entries for
//! as long as it keeps the handle, no matter what writers do meanwhile.
//!
//! # Copy-on-write builders
//!
//! - [`Snapshot::with_entry`]: full copy plus one upserted entry
//! - [`Snapshot::without`]: full copy minus one entry
//!
//! Both are O(n) in the size of the snapshot. There is no structural
//! sharing between a snapshot and the one it was copied from.

use rustc_hash::FxHashMap;
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

/// One immutable, fully materialized key/value mapping
///
/// Backed by an `FxHashMap` for O(1) lookups with a fast non-crypto hash.
/// Iteration order is unspecified.
pub struct Snapshot<K, V> {
    data: FxHashMap<K, V>,
}

impl<K, V> Snapshot<K, V> {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self {
            data: FxHashMap::default(),
        }
    }

    /// Create an empty snapshot with room for `capacity` entries
    ///
    /// Only this empty snapshot is pre-sized. Copies made by
    /// [`with_entry`](Self::with_entry) and [`without`](Self::without)
    /// size themselves from the source length, so the hint does not carry
    /// over to later snapshots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the snapshot has no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over all entries in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.data.iter()
    }

    /// Iterate over all keys in unspecified order
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.data.keys()
    }

    /// Iterate over all values in unspecified order
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.data.values()
    }
}

impl<K: Hash + Eq, V> Snapshot<K, V> {
    /// Look up a value
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.data.get(key)
    }

    /// Check if a key is present
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.data.contains_key(key)
    }
}

impl<K: Hash + Eq + Clone, V: Clone> Snapshot<K, V> {
    /// Build a new snapshot holding every entry of `self` plus `key -> value`
    ///
    /// An existing entry for `key` is replaced in the copy. `self` is left
    /// untouched.
    pub fn with_entry(&self, key: K, value: V) -> Self {
        let mut data =
            FxHashMap::with_capacity_and_hasher(self.data.len() + 1, Default::default());
        data.extend(self.data.iter().map(|(k, v)| (k.clone(), v.clone())));
        data.insert(key, value);
        Self { data }
    }

    /// Build a new snapshot holding every entry of `self` except `key`
    ///
    /// Callers check presence first; copying to remove an absent key is
    /// wasted work.
    pub fn without<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut data = FxHashMap::with_capacity_and_hasher(self.data.len(), Default::default());
        data.extend(
            self.data
                .iter()
                .filter(|&(k, _)| <K as Borrow<Q>>::borrow(k) != key)
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        Self { data }
    }
}

impl<K, V> Default for Snapshot<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for Snapshot<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a Snapshot<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = std::collections::hash_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Snapshot<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.data.iter()).finish()
    }
}
