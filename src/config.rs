//! Configuration management for spectral-lab
//!
//! Settings are loaded from environment variables with defaults.
//!
//! # Environment Variables
//!
//! ## Spectral Configuration
//! - `SPECTRAL_PROVIDER`: genai provider (gemini|openai|anthropic|ollama|groq|xai|...) - default: "gemini"
//! - `SPECTRAL_MODEL`: Model name - default: "gemini-2.0-flash"
//! - `SPECTRAL_API_BASE_URL`: Custom model endpoint (proxies, gateways) - optional
//! - `SPECTRAL_REQUEST_TIMEOUT`: Per-call timeout in seconds - default: "60"
//! - `SPECTRAL_MAX_ATTEMPTS`: Classification attempts - default: "3"
//! - `SPECTRAL_RETRY_BACKOFF_MS`: Pause between attempts - default: "1000"
//! - `SPECTRAL_CACHE_TTL`: Cached analysis lifetime in seconds, 0 disables expiry - default: "86400"
//! - `SPECTRAL_LOG_LEVEL`: Logging level - default: "info"
//!
//! ## Profile Lookup
//! - `NEYNAR_API_KEY`: Neynar API key, required for `analyze`
//! - `SPECTRAL_NEYNAR_BASE_URL`: Neynar base URL - default: "https://api.neynar.com"
//!
//! ## GenAI Provider Credentials
//! Read directly by the genai library: `GEMINI_API_KEY`, `OPENAI_API_KEY`,
//! `ANTHROPIC_API_KEY`, `GROQ_API_KEY`, `XAI_API_KEY`, `OLLAMA_HOST`.

use crate::analysis::{RetryPolicy, SamplingConfig};
use crate::llm::{BackendError, GenAIClient, LLMClient};
use crate::profile::{LookupError, NeynarClient};
use genai::adapter::AdapterKind;
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PROVIDER: AdapterKind = AdapterKind::Gemini;
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 1000;
const DEFAULT_CACHE_TTL_SECS: u64 = 86_400;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid provider: {0}. Valid options: gemini, openai, anthropic, ollama, groq, xai, deepseek, cohere")]
    InvalidProvider(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("NEYNAR_API_KEY is not set; it is required for profile lookups")]
    MissingNeynarKey,

    #[error("Backend initialization failed: {0}")]
    BackendInitError(#[from] BackendError),

    #[error("Profile source initialization failed: {0}")]
    ProfileSourceInitError(#[from] LookupError),
}

/// Parses a provider name the way genai spells it (`gemini`, `openai`, ...).
pub fn parse_provider(name: &str) -> Result<AdapterKind, ConfigError> {
    AdapterKind::from_lower_str(&name.trim().to_lowercase())
        .ok_or_else(|| ConfigError::InvalidProvider(name.to_string()))
}

#[derive(Debug, Clone)]
pub struct SpectralConfig {
    pub provider: AdapterKind,
    pub model: String,
    /// Overrides the provider's default endpoint
    pub api_base_url: Option<String>,
    pub request_timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    /// 0 means cached analyses never expire
    pub cache_ttl_secs: u64,
    pub log_level: String,
    pub neynar_api_key: Option<String>,
    pub neynar_base_url: Option<String>,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Default for SpectralConfig {
    /// Loads from `SPECTRAL_*` and `NEYNAR_API_KEY`, falling back to defaults
    /// for anything unset or unparsable.
    fn default() -> Self {
        let provider = env_non_empty("SPECTRAL_PROVIDER")
            .and_then(|p| parse_provider(&p).ok())
            .unwrap_or(DEFAULT_PROVIDER);

        let model = env_non_empty("SPECTRAL_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let log_level = env::var("SPECTRAL_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            provider,
            model,
            api_base_url: env_non_empty("SPECTRAL_API_BASE_URL"),
            request_timeout_secs: env_parse("SPECTRAL_REQUEST_TIMEOUT")
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_attempts: env_parse("SPECTRAL_MAX_ATTEMPTS").unwrap_or(DEFAULT_MAX_ATTEMPTS),
            retry_backoff_ms: env_parse("SPECTRAL_RETRY_BACKOFF_MS")
                .unwrap_or(DEFAULT_RETRY_BACKOFF_MS),
            cache_ttl_secs: env_parse("SPECTRAL_CACHE_TTL").unwrap_or(DEFAULT_CACHE_TTL_SECS),
            log_level,
            neynar_api_key: env_non_empty("NEYNAR_API_KEY"),
            neynar_base_url: env_non_empty("SPECTRAL_NEYNAR_BASE_URL"),
        }
    }
}

impl SpectralConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Model name cannot be empty".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        if !(1..=10).contains(&self.max_attempts) {
            return Err(ConfigError::ValidationFailed(format!(
                "Max attempts must be between 1 and 10, got {}",
                self.max_attempts
            )));
        }

        if self.retry_backoff_ms > 60_000 {
            return Err(ConfigError::ValidationFailed(
                "Retry backoff cannot exceed 60 seconds".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.retry_backoff_ms))
    }

    pub fn sampling(&self) -> SamplingConfig {
        SamplingConfig::default()
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        match self.cache_ttl_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn create_client(&self) -> Result<Arc<dyn LLMClient>, ConfigError> {
        let client = GenAIClient::new(
            self.provider,
            self.model.clone(),
            self.request_timeout(),
            self.api_base_url.clone(),
        )?;
        Ok(Arc::new(client))
    }

    pub fn create_profile_source(&self) -> Result<NeynarClient, ConfigError> {
        let api_key = self
            .neynar_api_key
            .as_deref()
            .ok_or(ConfigError::MissingNeynarKey)?;
        Ok(NeynarClient::new(
            api_key,
            self.neynar_base_url.clone(),
            self.request_timeout(),
        )?)
    }
}

impl fmt::Display for SpectralConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Spectral Configuration:")?;
        writeln!(f, "  Provider: {}", self.provider.as_str())?;
        writeln!(f, "  Model: {}", self.model)?;
        if let Some(ref url) = self.api_base_url {
            writeln!(f, "  API Base URL: {}", url)?;
        }
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(
            f,
            "  Retry: {} attempts, {}ms backoff",
            self.max_attempts, self.retry_backoff_ms
        )?;
        writeln!(f, "  Cache TTL: {}s", self.cache_ttl_secs)?;
        writeln!(
            f,
            "  Neynar API Key: {}",
            if self.neynar_api_key.is_some() {
                "set"
            } else {
                "not set"
            }
        )?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    /// Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    fn clear_env() -> Vec<EnvGuard> {
        [
            "SPECTRAL_PROVIDER",
            "SPECTRAL_MODEL",
            "SPECTRAL_API_BASE_URL",
            "SPECTRAL_REQUEST_TIMEOUT",
            "SPECTRAL_MAX_ATTEMPTS",
            "SPECTRAL_RETRY_BACKOFF_MS",
            "SPECTRAL_CACHE_TTL",
            "SPECTRAL_LOG_LEVEL",
            "NEYNAR_API_KEY",
            "SPECTRAL_NEYNAR_BASE_URL",
        ]
        .iter()
        .map(|k| EnvGuard::unset(k))
        .collect()
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = clear_env();

        let config = SpectralConfig::default();

        assert_eq!(config.provider, AdapterKind::Gemini);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(86_400)));
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert!(config.neynar_api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let mut guards = clear_env();
        guards.extend([
            EnvGuard::set("SPECTRAL_PROVIDER", "OpenAI"),
            EnvGuard::set("SPECTRAL_MODEL", "gpt-4o-mini"),
            EnvGuard::set("SPECTRAL_REQUEST_TIMEOUT", "30"),
            EnvGuard::set("SPECTRAL_MAX_ATTEMPTS", "5"),
            EnvGuard::set("SPECTRAL_RETRY_BACKOFF_MS", "250"),
            EnvGuard::set("SPECTRAL_CACHE_TTL", "0"),
            EnvGuard::set("SPECTRAL_LOG_LEVEL", "DEBUG"),
            EnvGuard::set("NEYNAR_API_KEY", "neynar-key"),
        ]);

        let config = SpectralConfig::default();

        assert_eq!(config.provider, AdapterKind::OpenAI);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(
            config.retry_policy(),
            RetryPolicy::new(5, Duration::from_millis(250))
        );
        assert_eq!(config.cache_ttl(), None);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.neynar_api_key.as_deref(), Some("neynar-key"));
    }

    #[test]
    #[serial]
    fn test_unparsable_values_fall_back() {
        let mut guards = clear_env();
        guards.extend([
            EnvGuard::set("SPECTRAL_PROVIDER", "skynet"),
            EnvGuard::set("SPECTRAL_REQUEST_TIMEOUT", "soon"),
            EnvGuard::set("SPECTRAL_MAX_ATTEMPTS", "-1"),
        ]);

        let config = SpectralConfig::default();
        assert_eq!(config.provider, DEFAULT_PROVIDER);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn test_parse_provider() {
        assert_eq!(parse_provider("gemini").unwrap(), AdapterKind::Gemini);
        assert_eq!(parse_provider(" Anthropic ").unwrap(), AdapterKind::Anthropic);
        assert!(matches!(
            parse_provider("skynet"),
            Err(ConfigError::InvalidProvider(_))
        ));
    }

    #[test]
    #[serial]
    fn test_validation_rejects_bad_values() {
        let _guards = clear_env();

        let mut config = SpectralConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = SpectralConfig::default();
        config.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = SpectralConfig::default();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = SpectralConfig::default();
        config.retry_backoff_ms = 120_000;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_profile_source_requires_key() {
        let _guards = clear_env();
        let config = SpectralConfig::default();
        assert!(matches!(
            config.create_profile_source(),
            Err(ConfigError::MissingNeynarKey)
        ));

        let _key = EnvGuard::set("NEYNAR_API_KEY", "abc");
        let config = SpectralConfig::default();
        assert!(config.create_profile_source().is_ok());
    }

    #[test]
    #[serial]
    fn test_create_client() {
        let _guards = clear_env();
        let client = SpectralConfig::default().create_client().unwrap();
        assert_eq!(client.name(), "Gemini");
    }

    #[test]
    #[serial]
    fn test_config_display() {
        let _guards = clear_env();
        let display = format!("{}", SpectralConfig::default());
        assert!(display.contains("Spectral Configuration:"));
        assert!(display.contains("Neynar API Key: not set"));
    }
}
