pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{AnalyzeArgs, CliArgs, ClassifyArgs, Commands, ModelArgs, RolesArgs};
pub use output::{OutputFormat, OutputFormatter};
