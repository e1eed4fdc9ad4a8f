use spectral_lab::cli::commands::{CliArgs, Commands};
use spectral_lab::cli::handlers::{handle_analyze, handle_classify, handle_roles};
use spectral_lab::util::logging::{init_logging, parse_level, LoggingConfig};
use spectral_lab::{NAME, VERSION};

use clap::Parser;
use std::env;
use std::process;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Analyze(analyze_args) => handle_analyze(analyze_args).await,
        Commands::Classify(classify_args) => handle_classify(classify_args).await,
        Commands::Roles(roles_args) => handle_roles(roles_args),
    };

    process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str).unwrap_or_else(|| {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        })
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        env::var("SPECTRAL_LOG_LEVEL")
            .ok()
            .and_then(|l| parse_level(&l))
            .unwrap_or(Level::INFO)
    };

    let use_json = args.log_json
        || env::var("SPECTRAL_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

    init_logging(LoggingConfig::with_level(level).json(use_json));
}
