//! Subcommand handlers. Each returns the process exit code.

use crate::analysis::{Classifier, EvaluationRequest, ModelInvoker};
use crate::cache::MemoryCache;
use crate::cli::commands::{AnalyzeArgs, ClassifyArgs, ModelArgs, RolesArgs};
use crate::cli::output::{OutputFormat, OutputFormatter};
use crate::config::SpectralConfig;
use crate::service::{ProfileAnalyzer, ServiceError};
use anyhow::{Context, Result};
use genai::adapter::AdapterKind;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Shape of the `classify` input document
#[derive(Debug, Deserialize)]
pub struct ClassifyInput {
    #[serde(default)]
    pub bio: Option<String>,
    pub posts: Vec<String>,
}

fn config_with_overrides(model: &ModelArgs) -> SpectralConfig {
    let default_config = SpectralConfig::default();
    let config = SpectralConfig {
        provider: model.provider.unwrap_or(default_config.provider),
        model: model.model.clone().unwrap_or(default_config.model),
        request_timeout_secs: model
            .timeout
            .unwrap_or(default_config.request_timeout_secs),
        ..default_config
    };

    if model.provider.is_some() {
        debug!("Provider explicitly set to: {}", config.provider.as_str());
    }
    if model.model.is_some() {
        debug!("Model overridden to: {}", config.model);
    }
    config
}

fn build_classifier(config: &SpectralConfig) -> Result<Classifier, i32> {
    let client = match config.create_client() {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to initialize model client: {}", e);
            eprintln!("\nPossible solutions:");
            match config.provider {
                AdapterKind::Gemini => eprintln!("  - Set GEMINI_API_KEY environment variable"),
                AdapterKind::OpenAI => eprintln!("  - Set OPENAI_API_KEY environment variable"),
                AdapterKind::Anthropic => {
                    eprintln!("  - Set ANTHROPIC_API_KEY environment variable")
                }
                AdapterKind::Groq => eprintln!("  - Set GROQ_API_KEY environment variable"),
                AdapterKind::Ollama => eprintln!("  - Ensure Ollama is running: ollama serve"),
                _ => eprintln!("  - Check provider-specific environment variables"),
            }
            eprintln!("  - Or pick another provider with --provider");
            return Err(1);
        }
    };

    info!(
        "Using model: {} ({})",
        client.name(),
        client.model_info().unwrap_or_else(|| config.model.clone())
    );

    Ok(
        Classifier::new(ModelInvoker::new(client, config.sampling()))
            .with_retry(config.retry_policy())
            .with_cache_ttl(config.cache_ttl()),
    )
}

pub async fn handle_analyze(args: &AnalyzeArgs) -> i32 {
    let config = config_with_overrides(&args.model);
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your environment variables and command-line arguments.");
        return 1;
    }

    let source = match config.create_profile_source() {
        Ok(source) => source,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", ServiceError::ConfigError(e.to_string()).help_message());
            return 1;
        }
    };

    let classifier = match build_classifier(&config) {
        Ok(classifier) => classifier,
        Err(code) => return code,
    };

    let analyzer = ProfileAnalyzer::new(
        Arc::new(source),
        Arc::new(MemoryCache::new()),
        classifier,
    )
    .with_post_limit(args.limit);

    info!("Analyzing fid {}", args.fid);
    let analysis = match analyzer.analyze(args.fid).await {
        Ok(analysis) => analysis,
        Err(e) => {
            error!("Analysis failed: {}", e);
            eprintln!("{}", e.help_message());
            return 1;
        }
    };

    let formatter = OutputFormatter::new(args.format.into());
    emit(formatter.format_analysis(&analysis))
}

pub async fn handle_classify(args: &ClassifyArgs) -> i32 {
    let config = config_with_overrides(&args.model);
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return 1;
    }

    let input = match read_input(args.input.as_deref()) {
        Ok(input) => input,
        Err(e) => {
            error!("Failed to read input: {:#}", e);
            return 1;
        }
    };

    let request = EvaluationRequest::new(input.bio, input.posts);
    if request.is_empty() {
        error!("Input contains no non-blank posts");
        return 1;
    }

    let classifier = match build_classifier(&config) {
        Ok(classifier) => classifier,
        Err(code) => return code,
    };

    info!("Classifying {} posts", request.posts.len());
    let result = match classifier.classify(&request).await {
        Ok(result) => result,
        Err(e) => {
            let err = ServiceError::from(e);
            error!("Classification failed: {}", err);
            eprintln!("{}", err.help_message());
            return 1;
        }
    };

    let formatter = OutputFormatter::new(args.format.into());
    emit(formatter.format_result(&result))
}

pub fn handle_roles(args: &RolesArgs) -> i32 {
    let format: OutputFormat = args.format.into();
    emit(OutputFormatter::new(format).format_roles())
}

fn emit(output: Result<String>) -> i32 {
    match output {
        Ok(out) => {
            println!("{}", out.trim_end());
            0
        }
        Err(e) => {
            error!("Failed to format output: {:#}", e);
            1
        }
    }
}

/// Reads the classify document from `path`, or stdin when absent.
pub fn read_input(path: Option<&Path>) -> Result<ClassifyInput> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    serde_json::from_str(&raw).context("Input must be JSON: {\"bio\": \"...\", \"posts\": [\"...\"]}")
}
