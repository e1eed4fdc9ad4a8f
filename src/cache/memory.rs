use super::CacheGateway;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-process [`CacheGateway`] with per-entry expiry.
///
/// Expired entries are dropped lazily on read or by [`MemoryCache::purge_expired`].
/// Clones share the same storage.
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        match self.entries.write() {
            Ok(mut entries) => {
                let before = entries.len();
                entries.retain(|_, entry| !entry.is_expired(now));
                before - entries.len()
            }
            Err(_) => 0,
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    /// Number of stored entries, expired ones included until purged
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheGateway for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let entry = self.entries.read().ok()?.get(key).cloned()?;

        if entry.is_expired(now) {
            trace!(key, "Cache entry expired");
            if let Ok(mut entries) = self.entries.write() {
                entries.remove(key);
            }
            return None;
        }

        Some(entry.value)
    }

    async fn put(&self, key: &str, value: Value, ttl: Option<Duration>) -> bool {
        let expires_at = ttl.and_then(|ttl| Instant::now().checked_add(ttl));
        match self.entries.write() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), CacheEntry { value, expires_at });
                true
            }
            Err(_) => false,
        }
    }

    fn name(&self) -> &str {
        "memory"
    }
}
