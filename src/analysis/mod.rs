//! Personality classification of a Farcaster member from their bio and posts

pub mod classifier;
pub mod error;
pub mod features;
pub mod invoker;
pub mod prompt;
pub mod request;
pub mod result;

pub use classifier::{Classifier, RetryPolicy};
pub use error::{ClassificationError, DeploymentIssue};
pub use features::{extract_features, ContentSummary, Theme};
pub use invoker::{ModelInvoker, SamplingConfig};
pub use prompt::build_prompt;
pub use request::{EvaluationRequest, MAX_POSTS};
pub use result::{
    ClassificationResult, DeploymentMetrics, FieldEvidence, Metric, ResearchDeployment,
    ResearchProfile,
};
