//! spectral-lab - personality classification for Farcaster profiles
//!
//! A member's bio and recent casts go through a fixed pipeline:
//!
//! ```text
//! EvaluationRequest
//!   -> extract_features   (lexical buckets + ranked themes)
//!   -> build_prompt       (taxonomy + evidence + JSON template)
//!   -> ModelInvoker       (LLMClient, low temperature)
//!   -> ResponseValidator  (presence, metrics, lengths, deployment, role consistency)
//!   -> ClassificationResult
//! ```
//!
//! Any failure after the prompt is built is retried, up to three attempts
//! with a pause between them. [`service::ProfileAnalyzer`] wraps the pipeline
//! with a Neynar profile lookup and a [`cache::CacheGateway`].
//!
//! ```no_run
//! use spectral_lab::analysis::{Classifier, EvaluationRequest, ModelInvoker, SamplingConfig};
//! use spectral_lab::SpectralConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SpectralConfig::default();
//! let invoker = ModelInvoker::new(config.create_client()?, SamplingConfig::default());
//! let classifier = Classifier::new(invoker).with_retry(config.retry_policy());
//!
//! let request = EvaluationRequest::new(
//!     Some("building dev tools".to_string()),
//!     vec!["Shipped a new CLI today", "Refactored the parser again"],
//! );
//! let result = classifier.classify(&request).await?;
//! println!("{}", result.research_profile.research_deployment.verdict);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cache;
pub mod cli;
pub mod config;
pub mod llm;
pub mod profile;
pub mod service;
pub mod taxonomy;
pub mod util;
pub mod validation;

pub use analysis::{
    ClassificationError, ClassificationResult, Classifier, EvaluationRequest, RetryPolicy,
};
pub use cache::{CacheGateway, MemoryCache};
pub use config::{ConfigError, SpectralConfig};
pub use llm::{BackendError, GenAIClient, LLMClient, MockLLMClient};
pub use profile::{NeynarClient, Profile, ProfileSource};
pub use service::{ProfileAnalysis, ProfileAnalyzer, ServiceError};
pub use util::{init_from_env, init_logging, LoggingConfig};
pub use validation::ResponseValidator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
