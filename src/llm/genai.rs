//! GenAI-based LLM client implementation
//!
//! Uses the `genai` crate to reach Gemini, OpenAI, Anthropic, Ollama, xAI and
//! Groq through one interface. Credentials come from the provider's standard
//! environment variable (`GEMINI_API_KEY`, `OPENAI_API_KEY`, ...).

use super::client::LLMClient;
use super::error::BackendError;
use super::types::{ChatMessage, LLMRequest, LLMResponse, MessageRole};
use async_trait::async_trait;
use genai::adapter::AdapterKind;
use genai::chat::{ChatMessage as GenAIChatMessage, ChatOptions, ChatRequest as GenAIChatRequest};
use genai::resolver::{AuthData, Endpoint, ServiceTargetResolver};
use genai::{Client, ModelIden, ServiceTarget};
use std::time::{Duration, Instant};
use tracing::{debug, error};

pub struct GenAIClient {
    client: Client,
    model: String,
    provider: AdapterKind,
    /// Ceiling imposed by the hosting environment on a single model call
    timeout: Duration,
}

impl GenAIClient {
    /// Creates a client for `provider`/`model`.
    ///
    /// When `endpoint` is set, every request is routed to that base URL
    /// instead of the provider default (useful for proxies and gateways).
    pub fn new(
        provider: AdapterKind,
        model: impl Into<String>,
        timeout: Duration,
        endpoint: Option<String>,
    ) -> Result<Self, BackendError> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(BackendError::ConfigurationError {
                message: "model name cannot be empty".to_string(),
            });
        }

        let client = match endpoint {
            Some(endpoint_url) => {
                debug!(
                    "Using custom endpoint for {}: {}",
                    provider.as_str(),
                    endpoint_url
                );
                let model_clone = model.clone();

                let resolver = ServiceTargetResolver::from_resolver_fn(
                    move |_service_target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
                        let auth = match provider.default_key_env_name() {
                            Some(api_key_var) => AuthData::from_env(api_key_var),
                            None => AuthData::from_single(""),
                        };

                        Ok(ServiceTarget {
                            endpoint: Endpoint::from_owned(endpoint_url.clone()),
                            auth,
                            model: ModelIden::new(provider, &model_clone),
                        })
                    },
                );

                Client::builder()
                    .with_service_target_resolver(resolver)
                    .build()
            }
            None => Client::default(),
        };

        debug!(
            "Creating GenAI client: provider={}, model={}",
            provider.as_str(),
            model
        );

        Ok(Self {
            client,
            model,
            provider,
            timeout,
        })
    }

    fn convert_message(msg: &ChatMessage) -> GenAIChatMessage {
        match msg.role {
            MessageRole::System => GenAIChatMessage::system(&msg.content),
            MessageRole::User => GenAIChatMessage::user(&msg.content),
            MessageRole::Assistant => GenAIChatMessage::assistant(&msg.content),
        }
    }
}

#[async_trait]
impl LLMClient for GenAIClient {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let start = Instant::now();

        let messages: Vec<GenAIChatMessage> =
            request.messages.iter().map(Self::convert_message).collect();
        let genai_request = GenAIChatRequest::new(messages);

        let mut options = ChatOptions::default();
        if let Some(temp) = request.temperature {
            options = options.with_temperature(temp as f64);
        }
        if let Some(max_tokens) = request.max_tokens {
            options = options.with_max_tokens(max_tokens);
        }

        let response = match tokio::time::timeout(
            self.timeout,
            self.client
                .exec_chat(&self.model, genai_request, Some(&options)),
        )
        .await
        {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                error!("{} API error: {}", self.provider.as_str(), e);
                return Err(BackendError::ApiError {
                    message: format!("{} request failed: {}", self.provider.as_str(), e),
                    status_code: None,
                });
            }
            Err(_) => {
                error!(
                    "{} request timed out after {}s",
                    self.provider.as_str(),
                    self.timeout.as_secs()
                );
                return Err(BackendError::TimeoutError {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let content = response.first_text().unwrap_or_default().to_string();

        Ok(LLMResponse::text(content, start.elapsed()))
    }

    fn name(&self) -> &str {
        self.provider.as_str()
    }

    fn model_info(&self) -> Option<String> {
        Some(self.model.clone())
    }
}

impl std::fmt::Debug for GenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAIClient")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}
