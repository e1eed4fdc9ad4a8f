//! Prompt construction for the classification model

use super::features::ContentSummary;
use super::result::{
    LengthBounds, CORE_IDENTITY, EVIDENCE_ANALYSIS, FUNCTIONAL_IMPACT, MAX_EVIDENCE_ITEMS,
    MAX_METRIC_SCORE, METRIC_CONTEXT, METRIC_NAMES, MIN_EVIDENCE_ITEMS, MIN_METRIC_SCORE,
    STABILITY_WARNING, VERDICT,
};
use crate::taxonomy::{DIVISIONS, ROLES};
use std::fmt::Write;

/// Bullets rendered per evidence bucket
pub const MAX_BULLETS: usize = 5;

const PREAMBLE: &str = "You are the intake officer of a research institute that assigns every \
new member a personality role based on how they write online. Read the member's bio and the \
evidence extracted from their recent posts, pick exactly one of the nine roles below, assign \
them to the division that owns that role, and justify the assignment with concrete observations. \
Ground every claim in the evidence; do not invent facts.";

const RULES: &str = "Formatting rules:
- Respond with a single JSON object and nothing else. No markdown fences, no commentary.
- spectralType is the number of the chosen role (1-9).
- The verdict MUST begin with \"Assigned to <Division Name>: \" using the division that owns the chosen role.
- Never describe the member as a different role than the one you chose.
- Every score is an integer from 1 to 5.
- Respect the character limits exactly.";

/// Builds the full model prompt. Total: never fails, whatever the inputs.
pub fn build_prompt(bio: Option<&str>, summary: &ContentSummary) -> String {
    let mut prompt = String::with_capacity(4096);

    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\n");

    prompt.push_str("DIVISIONS:\n");
    for division in DIVISIONS.iter() {
        let roles: Vec<&str> = division.roles().map(|r| r.name).collect();
        let _ = writeln!(
            prompt,
            "- {} (allowed roles: {}). Focus: {}",
            division.name,
            roles.join(", "),
            division.focus
        );
    }

    prompt.push_str("\nROLES:\n");
    for role in ROLES.iter() {
        let _ = writeln!(
            prompt,
            "{}. {} - \"{}\"",
            role.spectral_type, role.name, role.motto
        );
    }

    prompt.push_str("\nMEMBER BIO:\n");
    match bio.map(str::trim).filter(|b| !b.is_empty()) {
        Some(bio) => {
            let _ = writeln!(prompt, "{}", bio);
        }
        None => prompt.push_str("(no bio provided)\n"),
    }

    prompt.push_str("\nDOMINANT THEMES:\n");
    if summary.themes.is_empty() {
        prompt.push_str("(none detected)\n");
    } else {
        let themes: Vec<String> = summary
            .themes
            .iter()
            .map(|t| format!("{} ({})", t.token, t.count))
            .collect();
        let _ = writeln!(prompt, "{}", themes.join(", "));
    }

    let _ = writeln!(
        prompt,
        "\nSIGNAL COUNTS: technical depth {}, impact scope {}, stability indicators {}, methodology strength {}",
        summary.technical_depth,
        summary.impact_scope,
        summary.stability_indicators,
        summary.methodology_strength
    );

    let technical: Vec<&String> = summary
        .implementation
        .iter()
        .chain(&summary.problem_solving)
        .collect();
    render_bucket(&mut prompt, "TECHNICAL EVIDENCE", &technical);
    render_bucket(
        &mut prompt,
        "IMPACT EVIDENCE",
        &summary.contributions.iter().collect::<Vec<_>>(),
    );
    render_bucket(
        &mut prompt,
        "STABILITY EVIDENCE",
        &summary.iterations.iter().collect::<Vec<_>>(),
    );

    prompt.push('\n');
    prompt.push_str(RULES);
    prompt.push_str("\n\nRespond with JSON in exactly this shape:\n");
    prompt.push_str(&response_template());

    prompt
}

/// Renders one evidence bucket as bullet lines, deduplicated in first-seen order.
fn render_bucket(prompt: &mut String, title: &str, posts: &[&String]) {
    let _ = writeln!(prompt, "\n{}:", title);

    let mut seen: Vec<&str> = Vec::new();
    for post in posts {
        if seen.len() == MAX_BULLETS {
            break;
        }
        if !seen.contains(&post.as_str()) {
            seen.push(post.as_str());
        }
    }

    if seen.is_empty() {
        prompt.push_str("- (no matching posts)\n");
        return;
    }
    for post in seen {
        let _ = writeln!(prompt, "- {}", single_line(post));
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn bounds(b: &LengthBounds) -> String {
    if b.min == 0 {
        format!("max {} chars", b.prompt_max)
    } else {
        format!("{}-{} chars", b.min, b.prompt_max)
    }
}

fn response_template() -> String {
    let metrics: Vec<String> = METRIC_NAMES
        .iter()
        .map(|name| {
            format!(
                "      \"{}\": {{ \"score\": <integer {}-{}>, \"context\": \"<{}>\" }}",
                name,
                MIN_METRIC_SCORE,
                MAX_METRIC_SCORE,
                bounds(&METRIC_CONTEXT)
            )
        })
        .collect();

    format!(
        r#"{{
  "spectralType": <integer 1-9>,
  "researchProfile": {{
    "coreIdentity": "<{core}>",
    "functionalImpact": "<{impact}>",
    "stabilityWarning": "<{warning}>",
    "researchDeployment": {{
      "verdict": "Assigned to <Division Name>: <{verdict} in total>",
      "metrics": {{
{metrics}
      }}
    }},
    "fieldEvidence": [
      {{ "observation": "<quote or paraphrase of a post>", "analysis": "<{analysis}>" }}
    ]
  }}
}}
fieldEvidence must contain {min_items}-{max_items} items."#,
        core = bounds(&CORE_IDENTITY),
        impact = bounds(&FUNCTIONAL_IMPACT),
        warning = bounds(&STABILITY_WARNING),
        verdict = bounds(&VERDICT),
        metrics = metrics.join(",\n"),
        analysis = bounds(&EVIDENCE_ANALYSIS),
        min_items = MIN_EVIDENCE_ITEMS,
        max_items = MAX_EVIDENCE_ITEMS,
    )
}
