use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone, Debug)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: Instant,
}

/// In-memory store whose entries expire `ttl` after they were set.
///
/// Expired entries are treated as absent on read and are only replaced by a
/// later `set`; nothing sweeps them.
#[derive(Debug)]
pub struct TtlCache<T> {
    entries: HashMap<String, CacheEntry<T>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn is_valid(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .map(|entry| entry.timestamp.elapsed() < self.ttl)
            .unwrap_or(false)
    }

    pub fn get(&self, key: &str) -> Option<T> {
        if self.is_valid(key) {
            self.entries.get(key).map(|entry| entry.data.clone())
        } else {
            None
        }
    }

    pub fn set(&mut self, key: impl Into<String>, data: T) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                data,
                timestamp: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
