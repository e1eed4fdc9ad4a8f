//! Farcaster profile and post lookup

mod neynar;
mod types;

pub use neynar::{NeynarClient, DEFAULT_NEYNAR_BASE_URL};
pub use types::{LookupError, Profile};

use async_trait::async_trait;

/// Most posts ever requested for one analysis
pub const MAX_RECENT_POSTS: u32 = 50;

#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self, fid: u64) -> Result<Profile, LookupError>;

    /// Most recent top-level posts, newest first. `limit` is capped at
    /// [`MAX_RECENT_POSTS`].
    async fn fetch_recent_posts(&self, fid: u64, limit: u32) -> Result<Vec<String>, LookupError>;

    fn name(&self) -> &str;
}
