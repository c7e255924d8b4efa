//! RacyMemoCache: memo table with at-least-once loading

use std::hash::Hash;
use ahash::RandomState;
use dashmap::{DashMap, Entry};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::memoize::Memoize;
use crate::stats::CacheStats;
use crate::validate::KeyCheck;

/// Memoizing cache that never blocks on another caller's loader
///
/// Callers that miss on the same key concurrently each run their loader.
/// Results are installed with an insert-if-absent: the first one stored wins
/// and every racing caller returns that value. Losing results are dropped.
///
/// Suited to cheap loaders where duplicate work costs less than waiting.
pub struct RacyMemoCache<K, V> {
    map: DashMap<K, V, RandomState>,
    keys: KeyCheck<K>,
    stats: CacheStats,
}

impl<K, V> RacyMemoCache<K, V>
where
    K: Hash + Eq,
{
    /// Create an empty cache that accepts every key
    pub fn new() -> Self {
        Self::with_check(KeyCheck::any())
    }

    /// Create an empty cache whose keys must satisfy `validator`
    pub fn with_key_validator<F>(validator: F) -> Self
    where
        F: Fn(&K) -> bool + Send + Sync + 'static,
    {
        Self::with_check(KeyCheck::with(validator))
    }

    fn with_check(keys: KeyCheck<K>) -> Self {
        Self {
            map: DashMap::with_hasher(RandomState::new()),
            keys,
            stats: CacheStats::new(),
        }
    }
}

impl<K, V> Default for RacyMemoCache<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Memoize for RacyMemoCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    type Key = K;
    type Value = V;

    fn get_or_compute<F, E>(&self, key: K, loader: F) -> Result<V, E>
    where
        F: FnOnce(&K) -> std::result::Result<V, E>,
    {
        if let Err(e) = self.keys.check(&key) {
            self.stats.record_rejected();
            return Err(e);
        }

        if let Some(value) = self.map.get(&key) {
            self.stats.record_hit();
            return Ok(value.value().clone());
        }

        self.stats.record_miss();
        self.stats.record_load();
        trace!("cache miss, running loader");

        let value = match loader(&key) {
            Ok(value) => value,
            Err(e) => {
                debug!("loader failed, nothing stored");
                self.stats.record_load_failure();
                return Err(Error::LoaderFailure(e));
            }
        };

        match self.map.entry(key) {
            Entry::Occupied(entry) => {
                debug!("lost insert race, discarding computed value");
                self.stats.record_discard();
                Ok(entry.get().clone())
            }
            Entry::Vacant(entry) => {
                entry.insert(value.clone());
                Ok(value)
            }
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        self.map.get(key).map(|entry| entry.value().clone())
    }

    fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn stats(&self) -> &CacheStats {
        &self.stats
    }
}
