//! Short-TTL memoization of computed analytics views.
//!
//! One instance is injected into the request-facing service rather than
//! living in a module-level global, so tests can construct isolated caches.
//! Entries are dropped lazily on read once their TTL elapses; there is no
//! size bound, which is acceptable for a process-lifetime cache with a small
//! key space.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub data: Value,
    pub stored_at: Instant,
}

#[derive(Debug)]
pub struct ResultCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: RwLock::new(HashMap::new()) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value when present and fresh. A stale entry is
    /// removed and reported as a miss; the caller recomputes and re-`set`s.
    pub async fn get(&self, key: &str) -> Option<Value> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                    return Some(entry.data.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.stored_at.elapsed() < self.ttl {
                return Some(entry.data.clone());
            }
            entries.remove(key);
        }
        None
    }

    /// Stores `data` under `key`, replacing any prior entry. Concurrent
    /// writers race benignly: recomputation is deterministic for identical
    /// inputs, so last-write-wins is fine.
    pub async fn set(&self, key: &str, data: Value) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), CacheEntry { data, stored_at: Instant::now() });
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Deterministic cache key from an endpoint name and its query parameters.
/// Parameters are sorted by name so key construction is order-independent;
/// absent (None) parameters are left out entirely.
pub fn cache_key(endpoint: &str, params: &[(&str, Option<String>)]) -> String {
    let mut present: Vec<(&str, &str)> = params
        .iter()
        .filter_map(|(name, value)| value.as_deref().map(|value| (*name, value)))
        .collect();
    present.sort_by_key(|(name, _)| *name);

    let mut key = String::from(endpoint);
    for (index, (name, value)) in present.iter().enumerate() {
        key.push(if index == 0 { '?' } else { '&' });
        key.push_str(name);
        key.push('=');
        key.push_str(value);
    }
    key
}
