use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Public profile fields of a Farcaster user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub fid: u64,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

impl Profile {
    /// Display name when set, `@username` otherwise
    pub fn label(&self) -> String {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("@{}", self.username),
        }
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Profile lookup returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("No Farcaster user with fid {0}")]
    NotFound(u64),

    #[error("Could not decode profile lookup response: {0}")]
    Decode(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Profile lookup misconfigured: {0}")]
    Config(String),
}
