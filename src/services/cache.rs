use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Caller-owned TTL cache. Entries remember when they were stored and are
/// treated as missing once older than the TTL.
pub struct Cache<V> {
    entries: DashMap<String, (V, Instant)>,
    ttl: Duration,
}

impl<V: Clone> Cache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Fresh value for a key. Stale entries are evicted on read.
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.entries.get(key)?;
        let (value, inserted_at) = entry.value();
        if inserted_at.elapsed() < self.ttl {
            Some(value.clone())
        } else {
            drop(entry);
            self.entries.remove(key);
            None
        }
    }

    pub fn set(&self, key: String, value: V) {
        self.entries.insert(key, (value, Instant::now()));
    }

    /// Age of a fresh entry.
    pub fn age(&self, key: &str) -> Option<Duration> {
        self.entries
            .get(key)
            .map(|e| e.value().1.elapsed())
            .filter(|age| *age < self.ttl)
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        self.entries.remove(key).map(|(_, (value, _))| value)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Drop every stale entry.
    pub fn cleanup(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, (_, inserted_at)| inserted_at.elapsed() < ttl);
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
