use super::error::ClassificationError;
use crate::llm::{ChatMessage, LLMClient, LLMRequest};
use std::sync::Arc;
use tracing::debug;

/// Decoding parameters for the classification call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SamplingConfig {
    /// Low temperature for near-deterministic replies
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 2048,
        }
    }
}

/// Submits a prompt to the model and returns the raw reply text.
///
/// Does not look at the reply beyond checking that it is not blank.
pub struct ModelInvoker {
    client: Arc<dyn LLMClient>,
    sampling: SamplingConfig,
}

impl ModelInvoker {
    pub fn new(client: Arc<dyn LLMClient>, sampling: SamplingConfig) -> Self {
        Self { client, sampling }
    }

    pub fn sampling(&self) -> SamplingConfig {
        self.sampling
    }

    pub fn client_name(&self) -> &str {
        self.client.name()
    }

    pub async fn invoke(&self, prompt: &str) -> Result<String, ClassificationError> {
        let request = LLMRequest::new(vec![ChatMessage::user(prompt)])
            .with_temperature(self.sampling.temperature)
            .with_max_tokens(self.sampling.max_tokens);

        let response = self.client.chat(request).await?;

        debug!(
            client = self.client.name(),
            chars = response.content.len(),
            elapsed_ms = response.response_time.as_millis() as u64,
            "Model replied"
        );

        if response.is_blank() {
            return Err(ClassificationError::EmptyResponse);
        }

        Ok(response.content)
    }
}

impl std::fmt::Debug for ModelInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelInvoker")
            .field("client", &self.client.name())
            .field("sampling", &self.sampling)
            .finish()
    }
}
