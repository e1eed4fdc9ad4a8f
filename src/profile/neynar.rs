use super::types::{LookupError, Profile};
use super::{ProfileSource, MAX_RECENT_POSTS};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_NEYNAR_BASE_URL: &str = "https://api.neynar.com";

#[derive(Debug, Deserialize)]
struct BulkUsersResponse {
    #[serde(default)]
    users: Vec<NeynarUser>,
}

#[derive(Debug, Deserialize)]
struct NeynarUser {
    fid: u64,
    username: String,
    display_name: Option<String>,
    pfp_url: Option<String>,
    profile: Option<NeynarUserProfile>,
}

#[derive(Debug, Deserialize)]
struct NeynarUserProfile {
    bio: Option<NeynarBio>,
}

#[derive(Debug, Deserialize)]
struct NeynarBio {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CastsResponse {
    #[serde(default)]
    casts: Vec<NeynarCast>,
}

#[derive(Debug, Deserialize)]
struct NeynarCast {
    #[serde(default)]
    text: String,
}

impl From<NeynarUser> for Profile {
    fn from(user: NeynarUser) -> Self {
        let bio = user
            .profile
            .and_then(|p| p.bio)
            .and_then(|b| b.text)
            .filter(|t| !t.trim().is_empty());

        Profile {
            fid: user.fid,
            username: user.username,
            display_name: user.display_name,
            avatar_url: user.pfp_url,
            bio,
        }
    }
}

/// [`ProfileSource`] backed by the Neynar v2 REST API.
#[derive(Debug, Clone)]
pub struct NeynarClient {
    client: Client,
    base_url: String,
}

impl NeynarClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LookupError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LookupError::Config("Neynar API key is required".into()));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "x-api-key",
            header::HeaderValue::from_str(&api_key)
                .map_err(|e| LookupError::Config(format!("Invalid API key: {}", e)))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Config(format!("Failed to create client: {}", e)))?;

        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_NEYNAR_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, LookupError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Neynar request");

        let response = self.client.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LookupError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| LookupError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ProfileSource for NeynarClient {
    async fn fetch_profile(&self, fid: u64) -> Result<Profile, LookupError> {
        let response: BulkUsersResponse = self
            .get("/v2/farcaster/user/bulk", &[("fids", fid.to_string())])
            .await?;

        response
            .users
            .into_iter()
            .find(|u| u.fid == fid)
            .map(Profile::from)
            .ok_or(LookupError::NotFound(fid))
    }

    async fn fetch_recent_posts(&self, fid: u64, limit: u32) -> Result<Vec<String>, LookupError> {
        let limit = limit.clamp(1, MAX_RECENT_POSTS);
        let response: CastsResponse = self
            .get(
                "/v2/farcaster/feed/user/casts",
                &[
                    ("fid", fid.to_string()),
                    ("limit", limit.to_string()),
                    ("include_replies", "false".to_string()),
                ],
            )
            .await?;

        Ok(response
            .casts
            .into_iter()
            .map(|c| c.text)
            .filter(|t| !t.trim().is_empty())
            .collect())
    }

    fn name(&self) -> &str {
        "neynar"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_requires_api_key() {
        let err = NeynarClient::new("  ", None, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, LookupError::Config(_)));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = NeynarClient::new(
            "key",
            Some("http://localhost:9999/".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9999");

        let client = NeynarClient::new("key", None, Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), DEFAULT_NEYNAR_BASE_URL);
    }

    #[test]
    fn test_user_to_profile() {
        let user: NeynarUser = serde_json::from_value(json!({
            "fid": 3,
            "username": "dwr",
            "display_name": "Dan Romero",
            "pfp_url": "https://example.com/dwr.png",
            "profile": { "bio": { "text": "Working on Farcaster" } },
            "follower_count": 1000
        }))
        .unwrap();

        let profile = Profile::from(user);
        assert_eq!(profile.fid, 3);
        assert_eq!(profile.bio.as_deref(), Some("Working on Farcaster"));
        assert_eq!(profile.avatar_url.as_deref(), Some("https://example.com/dwr.png"));
    }

    #[test]
    fn test_user_without_bio() {
        let user: NeynarUser = serde_json::from_value(json!({
            "fid": 5,
            "username": "anon",
            "profile": { "bio": { "text": "" } }
        }))
        .unwrap();
        assert_eq!(Profile::from(user).bio, None);
    }
}
