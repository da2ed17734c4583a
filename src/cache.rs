use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// In-memory response cache keyed by request signature.
///
/// Entries expire `ttl` after they were stored. Expired entries are only
/// dropped when a lookup hits them; nothing sweeps the map in the
/// background. One instance is meant to be shared by every clone of a
/// client (wrap it in an `Arc`).
#[derive(Debug)]
pub struct ApiCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl Default for ApiCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ApiCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh payload stored under `key`, evicting it if it has expired.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_fresh(self.ttl) => Some(entry.payload.clone()),
            Some(_) => {
                debug!("Cache entry '{}' expired", key);
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store `payload` under `key`, stamped with the current time.
    pub fn insert(&self, key: impl Into<String>, payload: Value) {
        let entry = CacheEntry {
            payload,
            stored_at: Instant::now(),
        };
        self.lock().insert(key.into(), entry);
    }

    pub fn remove(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Drop every entry, fresh or not.
    pub fn clear(&self) {
        let mut entries = self.lock();
        debug!("Clearing {} cached responses", entries.len());
        entries.clear();
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // The map stays consistent even if a holder panicked mid-operation.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
