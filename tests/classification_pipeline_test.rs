//! End-to-end classification tests
//!
//! Drive the full features -> prompt -> model -> validator loop with a
//! scripted `MockLLMClient`.

mod support;

use serde_json::json;
use spectral_lab::analysis::result::{
    char_len, CORE_IDENTITY, FUNCTIONAL_IMPACT, METRIC_CONTEXT, STABILITY_WARNING, VERDICT,
};
use spectral_lab::analysis::{
    build_prompt, extract_features, ClassificationError, DeploymentIssue, EvaluationRequest,
};
use spectral_lab::cache::{analysis_key, CacheGateway, MemoryCache};
use spectral_lab::llm::{BackendError, MockResponse};
use spectral_lab::taxonomy::DIVISIONS;
use std::time::Duration;
use support::{
    fast_classifier, mock_client, reply_with_deployment, valid_reply, SCENARIO_POSTS,
};

fn scenario_request() -> EvaluationRequest {
    EvaluationRequest::new(None, SCENARIO_POSTS)
}

#[tokio::test]
async fn test_valid_reply_satisfies_every_bound() {
    let client = mock_client([MockResponse::json(&valid_reply())]);
    let result = fast_classifier(client.clone())
        .classify(&scenario_request())
        .await
        .unwrap();

    assert!((1..=9).contains(&result.spectral_type));

    let profile = &result.research_profile;
    assert!(CORE_IDENTITY.contains(char_len(&profile.core_identity)));
    assert!(FUNCTIONAL_IMPACT.contains(char_len(&profile.functional_impact)));
    assert!(STABILITY_WARNING.contains(char_len(&profile.stability_warning)));
    assert!(VERDICT.contains(char_len(&profile.research_deployment.verdict)));
    for (_, metric) in profile.research_deployment.metrics.iter() {
        assert!((1..=5).contains(&metric.score));
        assert!(METRIC_CONTEXT.contains(char_len(&metric.context)));
    }
    assert!((2..=3).contains(&profile.field_evidence.len()));

    // The role belongs to exactly one division, and it is the one the verdict names
    let owners: Vec<_> = DIVISIONS
        .iter()
        .filter(|d| d.allows(result.spectral_type))
        .collect();
    assert_eq!(owners.len(), 1);
    assert_eq!(result.division().unwrap().name, owners[0].name);

    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_scenario_posts_reach_the_prompt() {
    let summary = extract_features(&SCENARIO_POSTS);
    assert!(summary.methodology.contains(&SCENARIO_POSTS[0].to_string()));
    assert!(summary.problem_solving.contains(&SCENARIO_POSTS[0].to_string()));

    let client = mock_client([MockResponse::json(&valid_reply())]);
    fast_classifier(client.clone())
        .classify(&scenario_request())
        .await
        .unwrap();

    let prompt = client.requests()[0].prompt().unwrap().to_string();
    assert_eq!(prompt, build_prompt(None, &summary));
    assert!(prompt.contains(&format!("- {}", SCENARIO_POSTS[0])));
    assert!(prompt.contains(&format!("- {}", SCENARIO_POSTS[1])));
    assert!(prompt.contains("(no bio provided)"));
}

#[tokio::test]
async fn test_lab_orchestrator_in_research_unit_is_rejected() {
    let bad = reply_with_deployment(3, "Experimental Research Unit");
    let client = mock_client([
        MockResponse::json(&bad),
        MockResponse::json(&bad),
        MockResponse::json(&bad),
    ]);

    let err = fast_classifier(client.clone())
        .classify(&scenario_request())
        .await
        .unwrap_err();

    assert_eq!(client.call_count(), 3);
    assert_eq!(err.kind(), "ClassificationFailedError");
    assert_eq!(
        err.last_cause(),
        &ClassificationError::InvalidDeployment(DeploymentIssue::RoleMismatch {
            role: "Lab Orchestrator".to_string(),
            division: "Experimental Research Unit".to_string(),
        })
    );
}

#[tokio::test]
async fn test_exactly_three_attempts_on_persistent_failure() {
    let client = mock_client((0..5).map(|_| MockResponse::text("no json here")));

    let err = fast_classifier(client.clone())
        .classify(&scenario_request())
        .await
        .unwrap_err();

    assert_eq!(client.call_count(), 3);
    assert_eq!(client.remaining_responses(), 2);
    match err {
        ClassificationError::ClassificationFailed { attempts, source } => {
            assert_eq!(attempts, 3);
            assert_eq!(source.kind(), "MalformedJsonError");
        }
        other => panic!("Expected ClassificationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_mixed_failures_then_success() {
    let mut missing_evidence = valid_reply();
    missing_evidence["researchProfile"]
        .as_object_mut()
        .unwrap()
        .remove("fieldEvidence");

    let client = mock_client([
        MockResponse::error(BackendError::NetworkError {
            message: "connection reset".to_string(),
        }),
        MockResponse::json(&missing_evidence),
        MockResponse::text(format!(
            "Sure, here it is:\n```json\n{}\n```",
            serde_json::to_string_pretty(&valid_reply()).unwrap()
        )),
    ]);

    let result = fast_classifier(client.clone())
        .classify(&scenario_request())
        .await
        .unwrap();

    assert_eq!(result.spectral_type, 5);
    assert_eq!(client.call_count(), 3);

    let prompts: Vec<_> = client
        .requests()
        .iter()
        .map(|r| r.prompt().unwrap().to_string())
        .collect();
    assert!(prompts.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn test_role_drift_is_retried() {
    // Lab Orchestrator in its own division, but the narrative reads as a Toolsmith
    let drifted = reply_with_deployment(3, "Systems Integration Lab");
    let client = mock_client([MockResponse::json(&drifted), MockResponse::json(&valid_reply())]);

    let result = fast_classifier(client.clone())
        .classify(&scenario_request())
        .await
        .unwrap();

    assert_eq!(result.spectral_type, 5);
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn test_cached_classification_skips_model() {
    let client = mock_client([MockResponse::json(&valid_reply())]);
    let classifier = fast_classifier(client.clone());
    let cache = MemoryCache::new();
    let key = analysis_key(3);

    let (first, cached) = classifier
        .classify_cached(&cache, &key, &scenario_request())
        .await
        .unwrap();
    assert!(!cached);

    let (second, cached) = classifier
        .classify_cached(&cache, &key, &scenario_request())
        .await
        .unwrap();
    assert!(cached);
    assert_eq!(first, second);
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_expired_cache_entry_reads_as_miss() {
    let client = mock_client([
        MockResponse::json(&valid_reply()),
        MockResponse::json(&valid_reply()),
    ]);
    let classifier = fast_classifier(client.clone()).with_cache_ttl(Some(Duration::from_millis(20)));
    let cache = MemoryCache::new();

    classifier
        .classify_cached(&cache, "analysis:9", &scenario_request())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let (_, cached) = classifier
        .classify_cached(&cache, "analysis:9", &scenario_request())
        .await
        .unwrap();
    assert!(!cached);
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn test_request_without_posts_still_classifies() {
    let client = mock_client([MockResponse::json(&valid_reply())]);
    let request = EvaluationRequest::new(Some("lurker".to_string()), Vec::<String>::new());

    let result = fast_classifier(client.clone()).classify(&request).await;
    assert!(result.is_ok());

    let prompt = client.requests()[0].prompt().unwrap().to_string();
    assert!(prompt.contains("lurker"));
    assert!(prompt.contains("(none detected)"));
}

#[tokio::test]
async fn test_cached_value_round_trips_through_json() {
    let client = mock_client([MockResponse::json(&valid_reply())]);
    let cache = MemoryCache::new();

    let (result, _) = fast_classifier(client)
        .classify_cached(&cache, "analysis:1", &scenario_request())
        .await
        .unwrap();

    let stored = cache.get("analysis:1").await.unwrap();
    assert_eq!(stored["spectralType"], json!(5));
    assert_eq!(stored, serde_json::to_value(&result).unwrap());
}
