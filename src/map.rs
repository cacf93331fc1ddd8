//! Engine-selecting map entry point.
//!
//! [`CowMap`] wraps one of the two engines chosen at build time and
//! forwards every operation to it. Use it when the engine is a deployment
//! decision (for example read from a config file); use [`CasMap`] or
//! [`MutexMap`] directly when it is fixed in code.

use crate::config::{EngineKind, MapConfig};
use crate::error::Result;
use cowmap_concurrency::{CasMap, MutexMap};
use cowmap_core::{ConcurrentMap, Snapshot};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// A copy-on-write concurrent map backed by the configured engine.
///
/// # Example
///
/// ```ignore
/// use cowmap::prelude::*;
///
/// let map: CowMap<String, u64> = CowMap::builder()
///     .engine(EngineKind::Cas)
///     .capacity(128)
///     .build()?;
///
/// map.set("hits".to_string(), 0);
/// assert!(map.compare_and_swap(&"hits".to_string(), &0, 1));
/// ```
#[derive(Debug)]
pub enum CowMap<K, V> {
    /// Compare-and-swap engine
    Cas(CasMap<K, V>),
    /// Mutex engine
    Mutex(MutexMap<K, V>),
}

impl<K, V> CowMap<K, V> {
    /// Create an empty map on the default engine.
    pub fn new() -> Self {
        Self::with_engine(EngineKind::default())
    }

    /// Create an empty map on the given engine.
    pub fn with_engine(engine: EngineKind) -> Self {
        match engine {
            EngineKind::Cas => CowMap::Cas(CasMap::new()),
            EngineKind::Mutex => CowMap::Mutex(MutexMap::new()),
        }
    }

    /// Create a builder for map configuration.
    pub fn builder() -> CowMapBuilder<K, V> {
        CowMapBuilder::new()
    }

    /// Build a map from a validated configuration.
    pub fn from_config(config: &MapConfig) -> Result<Self> {
        config.validate()?;
        let map = match config.engine {
            EngineKind::Cas => CowMap::Cas(CasMap::with_capacity(config.capacity)),
            EngineKind::Mutex => CowMap::Mutex(MutexMap::with_capacity(config.capacity)),
        };
        debug!(engine = %config.engine, capacity = config.capacity, "built cow map");
        Ok(map)
    }

    /// Engine backing this map.
    pub fn engine(&self) -> EngineKind {
        match self {
            CowMap::Cas(_) => EngineKind::Cas,
            CowMap::Mutex(_) => EngineKind::Mutex,
        }
    }

    /// Lost publication races, for the CAS engine.
    ///
    /// Always `None` for the mutex engine, whose writers never retry.
    pub fn contention_retries(&self) -> Option<u64> {
        match self {
            CowMap::Cas(map) => Some(map.contention_retries()),
            CowMap::Mutex(_) => None,
        }
    }
}

impl<K, V> Default for CowMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> From<CasMap<K, V>> for CowMap<K, V> {
    fn from(map: CasMap<K, V>) -> Self {
        CowMap::Cas(map)
    }
}

impl<K, V> From<MutexMap<K, V>> for CowMap<K, V> {
    fn from(map: MutexMap<K, V>) -> Self {
        CowMap::Mutex(map)
    }
}

macro_rules! dispatch {
    ($self:ident, $map:ident => $call:expr) => {
        match $self {
            CowMap::Cas($map) => $call,
            CowMap::Mutex($map) => $call,
        }
    };
}

impl<K, V> ConcurrentMap<K, V> for CowMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn get(&self, key: &K) -> Option<V> {
        dispatch!(self, map => map.get(key))
    }

    fn set(&self, key: K, value: V) {
        dispatch!(self, map => map.set(key, value))
    }

    fn delete(&self, key: &K) {
        dispatch!(self, map => map.delete(key))
    }

    fn len(&self) -> usize {
        dispatch!(self, map => map.len())
    }

    fn has(&self, key: &K) -> bool {
        dispatch!(self, map => map.has(key))
    }

    fn clear(&self) {
        dispatch!(self, map => map.clear())
    }

    fn range<F>(&self, f: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        dispatch!(self, map => map.range(f))
    }

    fn keys(&self) -> Vec<K> {
        dispatch!(self, map => map.keys())
    }

    fn values(&self) -> Vec<V> {
        dispatch!(self, map => map.values())
    }

    fn get_or_set(&self, key: K, value: V) -> (V, bool) {
        dispatch!(self, map => map.get_or_set(key, value))
    }

    fn set_if_absent(&self, key: K, value: V) -> bool {
        dispatch!(self, map => map.set_if_absent(key, value))
    }

    fn compare_and_swap(&self, key: &K, old: &V, new: V) -> bool
    where
        V: PartialEq,
    {
        dispatch!(self, map => map.compare_and_swap(key, old, new))
    }

    fn snapshot(&self) -> Arc<Snapshot<K, V>> {
        dispatch!(self, map => map.snapshot())
    }
}

/// Builder for [`CowMap`].
///
/// ```ignore
/// let map: CowMap<u64, String> = CowMap::builder()
///     .engine(EngineKind::Mutex)
///     .capacity(1024)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct CowMapBuilder<K, V> {
    config: MapConfig,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> CowMapBuilder<K, V> {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: MapConfig::default(),
            _marker: PhantomData,
        }
    }

    /// Select the engine.
    pub fn engine(mut self, engine: EngineKind) -> Self {
        self.config.engine = engine;
        self
    }

    /// Pre-size the first snapshot.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Replace all settings with `config`.
    pub fn config(mut self, config: MapConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the settings and build the map.
    pub fn build(self) -> Result<CowMap<K, V>> {
        CowMap::from_config(&self.config)
    }
}

impl<K, V> Default for CowMapBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
