//! Profile analysis service
//!
//! `ProfileAnalyzer` is the entry point a front end talks to: given a
//! Farcaster fid it looks up the profile, serves a cached analysis when one
//! exists, and otherwise fetches recent posts and runs the classifier.
//!
//! ```text
//! ProfileAnalyzer
//!   ├── ProfileSource   (Neynar: profile + recent casts)
//!   ├── CacheGateway    (analysis:{fid})
//!   └── Classifier      (features -> prompt -> model -> validator, with retry)
//! ```

use crate::analysis::{ClassificationError, ClassificationResult, Classifier, EvaluationRequest};
use crate::cache::{analysis_key, CacheGateway};
use crate::llm::BackendError;
use crate::profile::{LookupError, Profile, ProfileSource, MAX_RECENT_POSTS};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

/// Generic text shown to end users when an analysis cannot be produced
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "We couldn't analyze this profile right now. Please try again in a moment.";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Profile lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("User {fid} has no posts to analyze")]
    NoPosts { fid: u64 },

    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ServiceError {
    /// Message safe to show to an end user. Never includes validation
    /// diagnostics or upstream error bodies.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Lookup(LookupError::NotFound(fid)) => {
                format!("No Farcaster user found for fid {}.", fid)
            }
            ServiceError::NoPosts { .. } => {
                "This profile has no posts yet, so there is nothing to analyze.".to_string()
            }
            _ => ANALYSIS_FAILED_MESSAGE.to_string(),
        }
    }

    /// Operator-facing message with troubleshooting hints
    pub fn help_message(&self) -> String {
        match self {
            ServiceError::Lookup(LookupError::NotFound(fid)) => format!(
                "Error: Farcaster user not found\nFid: {}\n\n\
                Help: Check that the fid is correct and the account still exists.",
                fid
            ),
            ServiceError::Lookup(LookupError::Http { status, message }) => {
                let hint = match status {
                    401 | 403 => "- Check NEYNAR_API_KEY is set and valid",
                    429 => "- Neynar rate limit reached, wait and retry",
                    _ => "- Check Neynar status and retry",
                };
                format!(
                    "Error: Profile lookup failed with HTTP {}\n\n\
                    Help: Try:\n{}\n\
                    - Override the API base with SPECTRAL_NEYNAR_BASE_URL if self-hosting\n\n\
                    Details: {}",
                    status, hint, message
                )
            }
            ServiceError::Lookup(other) => format!(
                "Error: Profile lookup failed\n\n\
                Help: Check network connectivity and NEYNAR_API_KEY.\n\n\
                Details: {}",
                other
            ),
            ServiceError::NoPosts { fid } => format!(
                "Error: No posts to analyze\nFid: {}\n\n\
                Help: The account has no recent top-level casts. Classification \
                needs at least one post.",
                fid
            ),
            ServiceError::Classification(err) => match err.last_cause() {
                ClassificationError::Transport(BackendError::TimeoutError { seconds }) => format!(
                    "Error: Model request timed out after {} seconds\n\n\
                    Help: Try:\n\
                    - Increase timeout: SPECTRAL_REQUEST_TIMEOUT={}\n\
                    - Check network connectivity\n\
                    - Try a faster model with SPECTRAL_MODEL",
                    seconds,
                    seconds * 2
                ),
                ClassificationError::Transport(BackendError::AuthenticationError { message }) => {
                    format!(
                        "Error: Model authentication failed\n\n\
                        Help: Check the API key for SPECTRAL_PROVIDER is set and valid.\n\n\
                        Details: {}",
                        message
                    )
                }
                _ => format!(
                    "Error: Classification failed\n\n\
                    Help: The model did not produce an acceptable analysis. Try:\n\
                    - Retry the operation\n\
                    - Try a different model with SPECTRAL_MODEL\n\
                    - Run with -v to see each rejected attempt\n\n\
                    Details: {}",
                    err
                ),
            },
            ServiceError::ConfigError(msg) => format!(
                "Error: Configuration error\n\n\
                Help: Configuration validation failed. Check the SPECTRAL_* \
                environment variables.\n\n\
                Details: {}",
                msg
            ),
        }
    }
}

/// Outcome of analyzing one Farcaster user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileAnalysis {
    pub profile: Profile,
    pub result: ClassificationResult,
    pub cached: bool,
}

pub struct ProfileAnalyzer {
    source: Arc<dyn ProfileSource>,
    cache: Arc<dyn CacheGateway>,
    classifier: Classifier,
    post_limit: u32,
}

impl ProfileAnalyzer {
    pub fn new(
        source: Arc<dyn ProfileSource>,
        cache: Arc<dyn CacheGateway>,
        classifier: Classifier,
    ) -> Self {
        Self {
            source,
            cache,
            classifier,
            post_limit: MAX_RECENT_POSTS,
        }
    }

    pub fn with_post_limit(mut self, limit: u32) -> Self {
        self.post_limit = limit.clamp(1, MAX_RECENT_POSTS);
        self
    }

    pub async fn analyze(&self, fid: u64) -> Result<ProfileAnalysis, ServiceError> {
        let started = Instant::now();
        let key = analysis_key(fid);

        let profile = self.source.fetch_profile(fid).await?;

        if let Some(result) = Classifier::cached(self.cache.as_ref(), &key).await {
            info!(fid, "Serving cached analysis");
            return Ok(ProfileAnalysis {
                profile,
                result,
                cached: true,
            });
        }

        let posts = self.source.fetch_recent_posts(fid, self.post_limit).await?;
        let request = EvaluationRequest::new(profile.bio.clone(), posts);
        if request.is_empty() {
            warn!(fid, "No posts to analyze");
            return Err(ServiceError::NoPosts { fid });
        }

        let (result, cached) = self
            .classifier
            .classify_cached(self.cache.as_ref(), &key, &request)
            .await?;

        info!(
            fid,
            spectral_type = result.spectral_type,
            posts = request.posts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Profile analyzed"
        );

        Ok(ProfileAnalysis {
            profile,
            result,
            cached,
        })
    }
}

impl std::fmt::Debug for ProfileAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileAnalyzer")
            .field("source", &self.source.name())
            .field("cache", &self.cache.name())
            .field("classifier", &self.classifier)
            .field("post_limit", &self.post_limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ModelInvoker, RetryPolicy, SamplingConfig};
    use crate::cache::MemoryCache;
    use crate::llm::{MockLLMClient, MockResponse};
    use crate::validation::fixtures::valid_reply;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct StubSource {
        posts: Vec<String>,
        post_calls: Mutex<u32>,
    }

    impl StubSource {
        fn new(posts: &[&str]) -> Self {
            Self {
                posts: posts.iter().map(|p| p.to_string()).collect(),
                post_calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl ProfileSource for StubSource {
        async fn fetch_profile(&self, fid: u64) -> Result<Profile, LookupError> {
            if fid == 404 {
                return Err(LookupError::NotFound(fid));
            }
            Ok(Profile {
                fid,
                username: "builder".to_string(),
                display_name: Some("Builder".to_string()),
                avatar_url: None,
                bio: Some("I make tools".to_string()),
            })
        }

        async fn fetch_recent_posts(
            &self,
            _fid: u64,
            _limit: u32,
        ) -> Result<Vec<String>, LookupError> {
            *self.post_calls.lock().unwrap() += 1;
            Ok(self.posts.clone())
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn analyzer(
        source: Arc<StubSource>,
        client: Arc<MockLLMClient>,
        cache: Arc<MemoryCache>,
    ) -> ProfileAnalyzer {
        let classifier = Classifier::new(ModelInvoker::new(client, SamplingConfig::default()))
            .with_retry(RetryPolicy::new(3, Duration::from_millis(1)));
        ProfileAnalyzer::new(source, cache, classifier)
    }

    #[tokio::test]
    async fn test_analyze_then_serve_from_cache() {
        let source = Arc::new(StubSource::new(&["Shipped a new analysis tool today."]));
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::json(&valid_reply()));
        let cache = Arc::new(MemoryCache::new());
        let analyzer = analyzer(source.clone(), client.clone(), cache.clone());

        let first = analyzer.analyze(77).await.unwrap();
        assert!(!first.cached);
        assert_eq!(first.profile.username, "builder");
        assert_eq!(first.result.spectral_type, 5);
        assert!(cache.get("analysis:77").await.is_some());

        let second = analyzer.analyze(77).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.result, first.result);
        assert_eq!(client.call_count(), 1);
        assert_eq!(*source.post_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_no_posts() {
        let source = Arc::new(StubSource::new(&["   ", ""]));
        let client = Arc::new(MockLLMClient::new());
        let analyzer = analyzer(source, client.clone(), Arc::new(MemoryCache::new()));

        let err = analyzer.analyze(8).await.unwrap_err();
        assert!(matches!(err, ServiceError::NoPosts { fid: 8 }));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let source = Arc::new(StubSource::new(&["hello"]));
        let analyzer = analyzer(
            source,
            Arc::new(MockLLMClient::new()),
            Arc::new(MemoryCache::new()),
        );

        let err = analyzer.analyze(404).await.unwrap_err();
        assert!(matches!(err, ServiceError::Lookup(LookupError::NotFound(404))));
        assert!(err.user_message().contains("404"));
    }

    #[tokio::test]
    async fn test_classification_failure_message_is_generic() {
        let source = Arc::new(StubSource::new(&["Shipped a new analysis tool today."]));
        let client = Arc::new(MockLLMClient::new());
        client.add_responses(vec![
            MockResponse::text("{\"spectralType\": 5}"),
            MockResponse::text("{\"spectralType\": 5}"),
            MockResponse::text("{\"spectralType\": 5}"),
        ]);
        let cache = Arc::new(MemoryCache::new());
        let analyzer = analyzer(source, client, cache.clone());

        let err = analyzer.analyze(12).await.unwrap_err();
        assert!(matches!(err, ServiceError::Classification(_)));
        assert_eq!(err.user_message(), ANALYSIS_FAILED_MESSAGE);
        assert!(!err.user_message().contains("researchProfile"));
        assert!(err.help_message().contains("researchProfile"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_timeout_help_message() {
        let err = ServiceError::Classification(ClassificationError::exhausted(
            3,
            ClassificationError::Transport(BackendError::TimeoutError { seconds: 60 }),
        ));
        let help = err.help_message();
        assert!(help.contains("timed out after 60 seconds"));
        assert!(help.contains("SPECTRAL_REQUEST_TIMEOUT=120"));
        assert_eq!(err.user_message(), ANALYSIS_FAILED_MESSAGE);
    }
}
