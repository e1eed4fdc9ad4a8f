//! Key/value storage for finished analyses

mod memory;

pub use memory::MemoryCache;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Retention for cached analyses when no TTL is configured
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cache key for a Farcaster user's analysis
pub fn analysis_key(fid: u64) -> String {
    format!("analysis:{}", fid)
}

/// Abstract store in front of the classifier.
///
/// Failures are never surfaced: a broken backend reads as a miss and a
/// rejected write returns `false`.
#[async_trait]
pub trait CacheGateway: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;

    /// Stores `value` under `key`, expiring after `ttl` when one is given.
    async fn put(&self, key: &str, value: Value, ttl: Option<Duration>) -> bool;

    fn name(&self) -> &str;
}
