//! LLM client abstraction layer
//!
//! A trait-based seam over generative-text providers so the classification
//! pipeline can run against GenAI in production and a scripted mock in tests.

mod client;
mod error;
mod genai;
mod mock;
mod types;

pub use client::LLMClient;
pub use error::BackendError;
pub use self::genai::GenAIClient;
pub use mock::{MockLLMClient, MockResponse};
pub use types::{ChatMessage, LLMRequest, LLMResponse, MessageRole};
