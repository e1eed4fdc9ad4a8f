//! Output formatting for analyses, bare classifications and the taxonomy
//!
//! JSON and YAML are the serde shapes of the underlying types; the human
//! format is a boxed summary meant for a terminal.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write;

use crate::analysis::ClassificationResult;
use crate::service::ProfileAnalysis;
use crate::taxonomy::{DIVISIONS, ROLES};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

#[derive(Debug, Serialize)]
struct RoleEntry {
    spectral_type: u8,
    name: &'static str,
    motto: &'static str,
}

#[derive(Debug, Serialize)]
struct DivisionEntry {
    name: &'static str,
    focus: &'static str,
    roles: Vec<RoleEntry>,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_analysis(&self, analysis: &ProfileAnalysis) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(analysis)
                .context("Failed to serialize analysis to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(analysis).context("Failed to serialize analysis to YAML")
            }
            OutputFormat::Human => {
                let profile = &analysis.profile;
                let mut out = String::new();
                let _ = writeln!(out, "{} (fid {})", profile.label(), profile.fid);
                if let Some(bio) = &profile.bio {
                    let _ = writeln!(out, "\"{}\"", bio.trim());
                }
                if analysis.cached {
                    out.push_str("(cached analysis)\n");
                }
                out.push('\n');
                out.push_str(&self.human_result(&analysis.result));
                Ok(out)
            }
        }
    }

    pub fn format_result(&self, result: &ClassificationResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(result)
                .context("Failed to serialize classification to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(result)
                .context("Failed to serialize classification to YAML"),
            OutputFormat::Human => Ok(self.human_result(result)),
        }
    }

    pub fn format_roles(&self) -> Result<String> {
        let divisions: Vec<DivisionEntry> = DIVISIONS
            .iter()
            .map(|d| DivisionEntry {
                name: d.name,
                focus: d.focus,
                roles: d
                    .roles()
                    .map(|r| RoleEntry {
                        spectral_type: r.spectral_type,
                        name: r.name,
                        motto: r.motto,
                    })
                    .collect(),
            })
            .collect();

        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&divisions)
                .context("Failed to serialize taxonomy to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(&divisions).context("Failed to serialize taxonomy to YAML")
            }
            OutputFormat::Human => {
                let mut out = String::new();
                for division in &divisions {
                    let _ = writeln!(out, "{}", division.name);
                    let _ = writeln!(out, "  {}", division.focus);
                    for (i, role) in division.roles.iter().enumerate() {
                        let connector = if i + 1 == division.roles.len() {
                            "\u{2514}\u{2500}"
                        } else {
                            "\u{251C}\u{2500}"
                        };
                        let _ = writeln!(
                            out,
                            "  {} {}. {} - \"{}\"",
                            connector, role.spectral_type, role.name, role.motto
                        );
                    }
                    out.push('\n');
                }
                let _ = writeln!(out, "{} roles in {} divisions", ROLES.len(), DIVISIONS.len());
                Ok(out)
            }
        }
    }

    fn human_result(&self, result: &ClassificationResult) -> String {
        let profile = &result.research_profile;
        let deployment = &profile.research_deployment;
        let mut out = String::new();

        let role = result
            .role()
            .map(|r| format!("{}. {}", r.spectral_type, r.name))
            .unwrap_or_else(|| format!("{}. (unknown role)", result.spectral_type));
        let division = result.division().map(|d| d.name).unwrap_or("(unknown division)");

        let _ = writeln!(out, "\u{2713} {}", role);
        if let Some(r) = result.role() {
            let _ = writeln!(out, "  \"{}\"", r.motto);
        }
        let _ = writeln!(out, "{}\n", RULE);
        let _ = writeln!(out, "Division:  {}\n", division);

        let _ = writeln!(out, "Core Identity:\n  {}\n", profile.core_identity);
        let _ = writeln!(out, "Functional Impact:\n  {}\n", profile.functional_impact);
        let _ = writeln!(out, "Stability Warning:\n  {}\n", profile.stability_warning);
        let _ = writeln!(out, "Verdict:\n  {}\n", deployment.verdict);

        out.push_str("Metrics:\n");
        let metrics: Vec<_> = deployment.metrics.iter().collect();
        for (i, (name, metric)) in metrics.iter().enumerate() {
            let connector = if i + 1 == metrics.len() {
                "\u{2514}\u{2500}"
            } else {
                "\u{251C}\u{2500}"
            };
            let bar = "\u{25A0}".repeat(usize::from(metric.score))
                + &"\u{25A1}".repeat(5usize.saturating_sub(usize::from(metric.score)));
            let _ = writeln!(
                out,
                "{} {:<20} {} {}/5  {}",
                connector, name, bar, metric.score, metric.context
            );
        }

        out.push_str("\nField Evidence:\n");
        for item in &profile.field_evidence {
            let _ = writeln!(out, "\u{2022} \"{}\"", item.observation);
            let _ = writeln!(out, "  {}", item.analysis);
        }

        out
    }
}
