//! The classify loop: features, prompt, invoke, validate, retry

use super::error::ClassificationError;
use super::features::extract_features;
use super::invoker::ModelInvoker;
use super::prompt::build_prompt;
use super::request::EvaluationRequest;
use super::result::ClassificationResult;
use crate::cache::CacheGateway;
use crate::validation::ResponseValidator;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How many times a classification is attempted and how long to wait
/// between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }
}

pub struct Classifier {
    invoker: ModelInvoker,
    validator: ResponseValidator,
    retry: RetryPolicy,
    cache_ttl: Option<Duration>,
}

impl Classifier {
    pub fn new(invoker: ModelInvoker) -> Self {
        Self {
            invoker,
            validator: ResponseValidator::default(),
            retry: RetryPolicy::default(),
            cache_ttl: Some(crate::cache::DEFAULT_TTL),
        }
    }

    pub fn with_validator(mut self, validator: ResponseValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// TTL applied to results written by [`Classifier::classify_cached`];
    /// `None` stores them without expiry.
    pub fn with_cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Classifies one member. The prompt is built once and reused verbatim
    /// for every attempt; any per-attempt failure is retried until the
    /// budget runs out.
    pub async fn classify(
        &self,
        request: &EvaluationRequest,
    ) -> Result<ClassificationResult, ClassificationError> {
        let summary = extract_features(&request.posts);
        let prompt = build_prompt(request.bio(), &summary);

        debug!(
            posts = request.posts.len(),
            themes = summary.themes.len(),
            prompt_chars = prompt.len(),
            "Prompt built"
        );

        let started = Instant::now();
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let outcome = match self.invoker.invoke(&prompt).await {
                Ok(raw) => self.validator.validate(&raw),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(result) => {
                    info!(
                        spectral_type = result.spectral_type,
                        attempt,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Classification succeeded"
                    );
                    return Ok(result);
                }
                Err(e) if attempt >= max_attempts => {
                    warn!(
                        attempt,
                        kind = e.kind(),
                        error = %e,
                        "Classification attempt failed, giving up"
                    );
                    return Err(ClassificationError::exhausted(attempt, e));
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts,
                        kind = e.kind(),
                        error = %e,
                        "Classification attempt failed, retrying"
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                }
            }
        }
    }

    /// Reads a previously stored result. Entries that no longer decode read
    /// as a miss.
    pub async fn cached(cache: &dyn CacheGateway, key: &str) -> Option<ClassificationResult> {
        let value = cache.get(key).await?;
        match serde_json::from_value::<ClassificationResult>(value) {
            Ok(result) => {
                debug!(key, cache = cache.name(), "Cache hit");
                Some(result)
            }
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Cache-aside wrapper around [`Classifier::classify`].
    ///
    /// A cached value that no longer decodes is treated as a miss. A failed
    /// write is logged and otherwise ignored.
    pub async fn classify_cached(
        &self,
        cache: &dyn CacheGateway,
        key: &str,
        request: &EvaluationRequest,
    ) -> Result<(ClassificationResult, bool), ClassificationError> {
        if let Some(result) = Self::cached(cache, key).await {
            return Ok((result, true));
        }

        let result = self.classify(request).await?;

        match serde_json::to_value(&result) {
            Ok(value) => {
                if !cache.put(key, value, self.cache_ttl).await {
                    warn!(key, cache = cache.name(), "Failed to store classification");
                }
            }
            Err(e) => warn!(key, error = %e, "Failed to encode classification"),
        }

        Ok((result, false))
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("invoker", &self.invoker)
            .field("rules", &self.validator.rule_names())
            .field("retry", &self.retry)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}
