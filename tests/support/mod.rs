//! Shared helpers for integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use spectral_lab::analysis::{Classifier, ModelInvoker, RetryPolicy, SamplingConfig};
use spectral_lab::llm::{MockLLMClient, MockResponse};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// The two posts used throughout the end-to-end scenario
pub const SCENARIO_POSTS: [&str; 2] = [
    "I debugged the pipeline for hours, then refactored it into a cleaner framework.",
    "Shipped a new analysis tool today.",
];

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Reply accepted by every default rule (Toolsmith, Systems Integration Lab)
pub fn valid_reply() -> Value {
    let raw = std::fs::read_to_string(fixture_path("toolsmith_reply.json"))
        .expect("fixture readable");
    serde_json::from_str(&raw).expect("fixture is JSON")
}

/// `valid_reply` with the verdict rewritten for another division
pub fn reply_with_deployment(spectral_type: u8, division: &str) -> Value {
    let mut reply = valid_reply();
    reply["spectralType"] = json!(spectral_type);
    reply["researchProfile"]["researchDeployment"]["verdict"] = json!(format!(
        "Assigned to {}: a steady builder whose instinct for turning repeated pain into reusable utilities keeps every project moving.",
        division
    ));
    reply
}

pub fn mock_client(replies: impl IntoIterator<Item = MockResponse>) -> Arc<MockLLMClient> {
    let client = Arc::new(MockLLMClient::new());
    client.add_responses(replies);
    client
}

/// Classifier over `client` with a near-zero backoff
pub fn fast_classifier(client: Arc<MockLLMClient>) -> Classifier {
    Classifier::new(ModelInvoker::new(client, SamplingConfig::default()))
        .with_retry(RetryPolicy::new(3, Duration::from_millis(5)))
}
