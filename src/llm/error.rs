//! Errors raised by LLM backends

use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors that can occur while talking to a generative-text provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BackendError {
    /// API request failed with the given message
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// Authentication failed or credentials are invalid
    AuthenticationError { message: String },

    /// Request timed out after the specified duration (in seconds)
    TimeoutError { seconds: u64 },

    /// Provider quota or rate limit exhausted
    RateLimitError { retry_after: Option<u64> },

    /// Missing API keys, unknown provider, bad endpoint
    ConfigurationError { message: String },

    NetworkError { message: String },

    Other { message: String },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::ApiError {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "API error ({}): {}", code, message)
                } else {
                    write!(f, "API error: {}", message)
                }
            }
            BackendError::AuthenticationError { message } => {
                write!(f, "Authentication failed: {}", message)
            }
            BackendError::TimeoutError { seconds } => {
                write!(f, "Request timed out after {} seconds", seconds)
            }
            BackendError::RateLimitError { retry_after } => {
                if let Some(seconds) = retry_after {
                    write!(f, "Rate limit exceeded, retry after {} seconds", seconds)
                } else {
                    write!(f, "Rate limit exceeded")
                }
            }
            BackendError::ConfigurationError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            BackendError::NetworkError { message } => {
                write!(f, "Network error: {}", message)
            }
            BackendError::Other { message } => {
                write!(f, "Error: {}", message)
            }
        }
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = BackendError::ApiError {
            message: "quota".to_string(),
            status_code: Some(429),
        };
        assert_eq!(err.to_string(), "API error (429): quota");

        let err = BackendError::TimeoutError { seconds: 60 };
        assert_eq!(err.to_string(), "Request timed out after 60 seconds");

        let err = BackendError::RateLimitError { retry_after: None };
        assert_eq!(err.to_string(), "Rate limit exceeded");
    }
}
