//! In-memory TTL cache for expensive content loads.
//!
//! A deliberately small cache: freshness is decided by the *reader*, not the
//! writer. Every `get` carries its own TTL, so the same stored value can be
//! read under different freshness requirements by different callers. Expired
//! entries are evicted lazily on lookup; there is no background sweeper.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// Thread-safe key→value cache with read-time TTL and lazy eviction.
///
/// Absence is the only negative signal; no cache operation can fail.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Remove a single entry.
    pub fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of stored entries, including ones that would expire on the
    /// next `get`.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<V: Clone> TtlCache<V> {
    /// Look up `key`, treating entries older than `ttl` as absent.
    ///
    /// An expired entry is deleted as a side effect, so a subsequent call
    /// observes a clean miss.
    pub fn get(&self, key: &str, ttl: Duration) -> Option<V> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() <= ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store `value` under `key`, overwriting any previous entry and
    /// resetting its age.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let mut entries = self.entries.lock();
        entries.insert(
            key.into(),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Memoize `producer` under `key` with the given freshness requirement.
    ///
    /// The lock is not held while the producer runs, so concurrent callers
    /// racing on a miss may both recompute (no single-flight). That is
    /// acceptable for the idempotent filesystem loads this cache fronts.
    pub fn get_or_insert_with<F>(&self, key: &str, ttl: Duration, producer: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(key, ttl) {
            debug!(key, "cache hit");
            return value;
        }
        debug!(key, "cache miss");
        let value = producer();
        self.set(key, value.clone());
        value
    }

    /// Fallible variant of [`get_or_insert_with`](Self::get_or_insert_with):
    /// only successful results are cached, errors pass through uncached.
    pub fn get_or_try_insert_with<F, E>(
        &self,
        key: &str,
        ttl: Duration,
        producer: F,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> std::result::Result<V, E>,
    {
        if let Some(value) = self.get(key, ttl) {
            debug!(key, "cache hit");
            return Ok(value);
        }
        debug!(key, "cache miss");
        let value = producer()?;
        self.set(key, value.clone());
        Ok(value)
    }
}
