//! Operations shared by every memoizing cache

use crate::error::Result;
use crate::stats::CacheStats;

/// A key-to-value memo table that computes missing values on demand
///
/// Stored values are never replaced or removed. Implementations differ only in
/// what happens when several callers miss on the same key at once.
pub trait Memoize {
    /// Lookup key
    type Key;
    /// Stored value, handed out by clone
    type Value;

    /// Return the stored value for `key`, computing it with `loader` on a miss
    ///
    /// A loader error is returned as [`Error::LoaderFailure`] and leaves the
    /// key absent, so a later call runs a loader again.
    ///
    /// [`Error::LoaderFailure`]: crate::Error::LoaderFailure
    fn get_or_compute<F, E>(&self, key: Self::Key, loader: F) -> Result<Self::Value, E>
    where
        F: FnOnce(&Self::Key) -> std::result::Result<Self::Value, E>;

    /// Return the stored value without computing anything
    fn get(&self, key: &Self::Key) -> Option<Self::Value>;

    /// Check whether a value is stored for `key`
    fn contains_key(&self, key: &Self::Key) -> bool;

    /// Number of stored values
    fn len(&self) -> usize;

    /// Check whether no value is stored
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics
    fn stats(&self) -> &CacheStats;
}
