//! MemoCache: memo table with single-flight loading

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use ahash::RandomState;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::flight::Flight;
use crate::memoize::Memoize;
use crate::stats::CacheStats;
use crate::validate::KeyCheck;

type Slots<K, V> = Mutex<HashMap<K, Slot<V>, RandomState>>;

enum Slot<V> {
    /// Leader is running the loader
    Pending(Arc<Flight>),
    /// Final value, never replaced
    Ready(V),
}

enum Role {
    Lead(Arc<Flight>),
    Wait(Arc<Flight>),
}

/// Memoizing cache where each key's loader runs at most once at a time
///
/// The first caller to miss on a key becomes its leader: it installs a pending
/// marker and runs the loader with no lock held, so lookups for other keys
/// proceed. Callers that arrive while the marker is present block until the
/// leader finishes and then read the stored value.
///
/// If the loader fails or panics the marker is removed and the waiters wake
/// up to find the key absent again. One of them becomes the new leader and
/// runs its own loader; each caller therefore sees either the stored value or
/// an error from a loader it supplied.
///
/// A loader may look up other keys in the same cache, but never its own key:
/// that call would wait on its own flight forever.
///
/// ```
/// use memocache::{MemoCache, Memoize};
///
/// let cache = MemoCache::new();
/// let value = cache.get_or_compute("id1", |id| Ok::<_, ()>(format!("Data for {id}")));
/// assert_eq!(value.unwrap(), "Data for id1");
///
/// // Served from the store; this loader never runs.
/// let value = cache.get_or_compute("id1", |_| Err(()));
/// assert_eq!(value.unwrap(), "Data for id1");
/// ```
pub struct MemoCache<K, V> {
    slots: Slots<K, V>,
    keys: KeyCheck<K>,
    stats: CacheStats,
}

impl<K, V> MemoCache<K, V>
where
    K: Hash + Eq,
{
    /// Create an empty cache that accepts every key
    pub fn new() -> Self {
        Self::with_check(KeyCheck::any())
    }

    /// Create an empty cache whose keys must satisfy `validator`
    ///
    /// Rejected keys fail with [`Error::InvalidArgument`] before the store is
    /// touched.
    pub fn with_key_validator<F>(validator: F) -> Self
    where
        F: Fn(&K) -> bool + Send + Sync + 'static,
    {
        Self::with_check(KeyCheck::with(validator))
    }

    fn with_check(keys: KeyCheck<K>) -> Self {
        Self {
            slots: Mutex::new(HashMap::with_hasher(RandomState::new())),
            keys,
            stats: CacheStats::new(),
        }
    }

    /// Number of keys whose loader is currently running
    pub fn pending_len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Pending(_)))
            .count()
    }
}

impl<K, V> Default for MemoCache<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MemoCache<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    fn lead<F, E>(&self, key: K, flight: Arc<Flight>, loader: F) -> Result<V, E>
    where
        F: FnOnce(&K) -> std::result::Result<V, E>,
    {
        trace!("cache miss, running loader");
        let guard = FlightGuard {
            slots: &self.slots,
            stats: &self.stats,
            key,
            flight,
            resolved: false,
        };

        self.stats.record_load();
        match loader(&guard.key) {
            Ok(value) => {
                guard.resolve(value.clone());
                Ok(value)
            }
            Err(e) => {
                debug!("loader failed, key released for retry");
                self.stats.record_load_failure();
                drop(guard);
                Err(Error::LoaderFailure(e))
            }
        }
    }
}

impl<K, V> Memoize for MemoCache<K, V>
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

        let mut missed = false;
        let flight = loop {
            let role = {
                let mut slots = self.slots.lock();
                match slots.get(&key) {
                    Some(Slot::Ready(value)) => {
                        if !missed {
                            self.stats.record_hit();
                        }
                        return Ok(value.clone());
                    }
                    Some(Slot::Pending(flight)) => Role::Wait(Arc::clone(flight)),
                    None => {
                        let flight = Flight::new();
                        slots.insert(key.clone(), Slot::Pending(Arc::clone(&flight)));
                        Role::Lead(flight)
                    }
                }
            };

            if !missed {
                missed = true;
                self.stats.record_miss();
            }

            match role {
                Role::Lead(flight) => break flight,
                Role::Wait(flight) => {
                    trace!("waiting on in-flight computation");
                    self.stats.record_wait();
                    flight.wait();
                }
            }
        };

        self.lead(key, flight, loader)
    }

    fn get(&self, key: &K) -> Option<V> {
        match self.slots.lock().get(key) {
            Some(Slot::Ready(value)) => Some(value.clone()),
            _ => None,
        }
    }

    fn contains_key(&self, key: &K) -> bool {
        matches!(self.slots.lock().get(key), Some(Slot::Ready(_)))
    }

    fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

/// Owns a pending marker while the leader runs the loader
///
/// Dropping an unresolved guard (loader error or panic) removes the marker and
/// wakes the waiters.
struct FlightGuard<'a, K, V>
where
    K: Hash + Eq,
{
    slots: &'a Slots<K, V>,
    stats: &'a CacheStats,
    key: K,
    flight: Arc<Flight>,
    resolved: bool,
}

impl<K, V> FlightGuard<'_, K, V>
where
    K: Hash + Eq,
{
    fn resolve(mut self, value: V) {
        if let Some(slot) = self.slots.lock().get_mut(&self.key) {
            *slot = Slot::Ready(value);
        }
        self.resolved = true;
        self.flight.complete();
    }
}

impl<K, V> Drop for FlightGuard<'_, K, V>
where
    K: Hash + Eq,
{
    fn drop(&mut self) {
        if self.resolved {
            return;
        }
        if std::thread::panicking() {
            warn!("loader panicked, key released for retry");
            self.stats.record_load_failure();
        }
        self.slots.lock().remove(&self.key);
        self.flight.complete();
    }
}
