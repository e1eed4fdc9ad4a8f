//! Structured logging setup
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a single
//! `fmt` layer, either human-readable or JSON. Log lines go to stderr so the
//! CLI's stdout carries only command output.
//!
//! ```no_run
//! use spectral_lab::util::logging;
//!
//! // SPECTRAL_LOG_LEVEL=debug SPECTRAL_LOG_JSON=true
//! logging::init_from_env();
//!
//! tracing::info!(fid = 3, "Analyzing profile");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Chatty dependencies capped at `warn` unless `RUST_LOG` says otherwise
const NOISY_TARGETS: [&str; 4] = ["h2", "hyper", "hyper_util", "reqwest"];

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    /// One JSON object per line instead of the pretty console format
    pub use_json: bool,
    pub include_target: bool,
    /// File and line of each event
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn json(mut self, use_json: bool) -> Self {
        self.use_json = use_json;
        self
    }
}

/// Case-insensitive level name, `None` for anything unrecognized.
pub fn parse_level(level_str: &str) -> Option<Level> {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn build_filter(config: &LoggingConfig, rust_log_set: bool) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();

    if let Ok(directive) = format!("spectral_lab={}", config.level.as_str().to_lowercase()).parse() {
        filter = filter.add_directive(directive);
    }

    if !rust_log_set {
        for target in NOISY_TARGETS {
            if let Ok(directive) = format!("{}=warn", target).parse() {
                filter = filter.add_directive(directive);
            }
        }
    }

    filter
}

/// Installs the global subscriber. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(&config, env::var("RUST_LOG").is_ok());

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location);

        let registry = tracing_subscriber::registry().with(filter);
        let result = if config.use_json {
            registry.with(layer.json()).try_init()
        } else {
            registry.with(layer).try_init()
        };

        if let Err(e) = result {
            eprintln!("Logging already initialized elsewhere: {}", e);
        }
    });
}

/// Reads `SPECTRAL_LOG_LEVEL` and `SPECTRAL_LOG_JSON`; `RUST_LOG` still
/// applies on top.
pub fn init_from_env() {
    let level = env::var("SPECTRAL_LOG_LEVEL")
        .ok()
        .and_then(|l| parse_level(&l))
        .unwrap_or(Level::INFO);

    let use_json = env::var("SPECTRAL_LOG_JSON")
        .ok()
        .and_then(|v| v.trim().parse::<bool>().ok())
        .unwrap_or(false);

    init_logging(LoggingConfig::with_level(level).json(use_json));
}
