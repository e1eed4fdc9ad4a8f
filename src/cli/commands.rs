use clap::{Parser, Subcommand, ValueEnum};
use genai::adapter::AdapterKind;
use std::path::PathBuf;

/// Personality classification for Farcaster profiles
#[derive(Parser, Debug)]
#[command(
    name = "spectral-lab",
    about = "Personality classification for Farcaster profiles",
    version,
    author,
    long_about = "spectral-lab reads a Farcaster member's bio and recent casts, asks an LLM \
                  to assign one of nine research roles within one of three divisions, and \
                  validates the reply against a strict contract before showing it."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only errors are logged"
    )]
    pub quiet: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Analyze a Farcaster user by fid",
        long_about = "Looks up the profile and recent casts through Neynar and classifies \
                      the member. Requires NEYNAR_API_KEY and the model provider's API key.\n\n\
                      Examples:\n  \
                      spectral-lab analyze 3\n  \
                      spectral-lab analyze 3 --format json\n  \
                      spectral-lab analyze 3 --provider openai --model gpt-4o-mini"
    )]
    Analyze(AnalyzeArgs),

    #[command(
        about = "Classify a bio and posts read from a file or stdin",
        long_about = "Classifies text supplied locally instead of fetching it. Input is JSON \
                      of the form {\"bio\": \"...\", \"posts\": [\"...\"]}.\n\n\
                      Examples:\n  \
                      spectral-lab classify member.json\n  \
                      cat member.json | spectral-lab classify --format json"
    )]
    Classify(ClassifyArgs),

    #[command(about = "List the divisions and roles of the taxonomy")]
    Roles(RolesArgs),
}

/// Model selection shared by commands that call the LLM
#[derive(Parser, Debug, Clone, Default)]
pub struct ModelArgs {
    #[arg(
        short = 'p',
        long,
        value_parser = parse_adapter_kind,
        help = "Model provider (overrides SPECTRAL_PROVIDER)"
    )]
    pub provider: Option<AdapterKind>,

    #[arg(
        short = 'm',
        long,
        value_name = "MODEL",
        help = "Model name (overrides SPECTRAL_MODEL)"
    )]
    pub model: Option<String>,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "Request timeout in seconds (overrides SPECTRAL_REQUEST_TIMEOUT)"
    )]
    pub timeout: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(value_name = "FID", help = "Farcaster user id")]
    pub fid: u64,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'n',
        long,
        value_name = "COUNT",
        default_value = "50",
        value_parser = clap::value_parser!(u32).range(1..=50),
        help = "Number of recent casts to analyze"
    )]
    pub limit: u32,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    #[arg(value_name = "FILE", help = "JSON input file (reads stdin when omitted)")]
    pub input: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct RolesArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_adapter_kind(s: &str) -> Result<AdapterKind, String> {
    crate::config::parse_provider(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_analyze_args() {
        let args = CliArgs::parse_from(["spectral-lab", "analyze", "3"]);
        match args.command {
            Commands::Analyze(analyze) => {
                assert_eq!(analyze.fid, 3);
                assert_eq!(analyze.format, OutputFormatArg::Human);
                assert_eq!(analyze.limit, 50);
                assert!(analyze.model.provider.is_none());
                assert!(analyze.model.model.is_none());
                assert!(analyze.model.timeout.is_none());
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_analyze_with_overrides() {
        let args = CliArgs::parse_from([
            "spectral-lab",
            "analyze",
            "194",
            "--format",
            "json",
            "--provider",
            "openai",
            "--model",
            "gpt-4o-mini",
            "--timeout",
            "30",
            "-n",
            "20",
        ]);
        match args.command {
            Commands::Analyze(analyze) => {
                assert_eq!(analyze.fid, 194);
                assert_eq!(analyze.format, OutputFormatArg::Json);
                assert_eq!(analyze.limit, 20);
                assert_eq!(analyze.model.provider, Some(AdapterKind::OpenAI));
                assert_eq!(analyze.model.model.as_deref(), Some("gpt-4o-mini"));
                assert_eq!(analyze.model.timeout, Some(30));
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_analyze_limit_bounds() {
        assert!(CliArgs::try_parse_from(["spectral-lab", "analyze", "3", "-n", "0"]).is_err());
        assert!(CliArgs::try_parse_from(["spectral-lab", "analyze", "3", "-n", "51"]).is_err());
    }

    #[test]
    fn test_analyze_requires_numeric_fid() {
        assert!(CliArgs::try_parse_from(["spectral-lab", "analyze", "dwr"]).is_err());
    }

    #[test]
    fn test_classify_from_file() {
        let args = CliArgs::parse_from(["spectral-lab", "classify", "member.json", "-f", "yaml"]);
        match args.command {
            Commands::Classify(classify) => {
                assert_eq!(classify.input, Some(PathBuf::from("member.json")));
                assert_eq!(classify.format, OutputFormatArg::Yaml);
            }
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_invalid_provider() {
        let result = CliArgs::try_parse_from(["spectral-lab", "analyze", "3", "-p", "skynet"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["spectral-lab", "roles", "-v", "--log-json"]);
        assert!(args.verbose);
        assert!(args.log_json);
        assert!(!args.quiet);

        assert!(CliArgs::try_parse_from(["spectral-lab", "roles", "-v", "-q"]).is_err());
    }
}
