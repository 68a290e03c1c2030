//! Time-to-live memo table for fetched feed data
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::api::adafruit::RawRecord;

/// Cache of successful feed fetches, keyed by feed key
pub type FeedCache = TtlCache<Vec<RawRecord>>;

struct CacheEntry<V> {
    value: V,
    /// `None` when the TTL reaches past what `Instant` can represent
    expires_at: Option<Instant>,
}

/// String-keyed cache where each entry expires a fixed `ttl` after insertion.
/// Stale entries are dropped on lookup.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a fresh copy of the value stored under `key`, if it has not expired
    pub fn get(&mut self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&mut self, key: &str, now: Instant) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.expires_at.map_or(false, |at| now >= at),
            None => return None,
        };

        if expired {
            self.entries.remove(key);
            return None;
        }

        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn insert(&mut self, key: &str, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub fn insert_at(&mut self, key: &str, value: V, now: Instant) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now.checked_add(self.ttl),
            },
        );
    }

    /// Drop every entry regardless of age
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
