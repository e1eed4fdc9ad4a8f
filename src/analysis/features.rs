//! Lexical feature extraction over a list of posts
//!
//! Pure and deterministic: the same ordered input always yields the same
//! [`ContentSummary`]. Posts are sorted into category buckets by regex
//! matchers and a frequency-ranked theme list is built from 1-3 word windows.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

/// Themes kept in the ranked list
pub const MAX_THEMES: usize = 10;
/// Tokens must be strictly longer than this many characters
const MIN_TOKEN_CHARS: usize = 4;
const MAX_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Research,
    Methodology,
    Implementation,
    ProblemSolving,
    Contribution,
    Iteration,
}

static CATEGORY_MATCHERS: Lazy<Vec<(Category, Regex)>> = Lazy::new(|| {
    let patterns = [
        (
            Category::Research,
            r"(?i)\b(research\w*|papers?|stud(y|ies)|hypothes[ie]s|experiment\w*|theor(y|ies)|analy[sz]\w*|findings?|data)\b",
        ),
        (
            Category::Methodology,
            r"(?i)\b(method\w*|framework\w*|approach\w*|systematic\w*|refactor\w*|architect\w*|design\w*)\b",
        ),
        (
            Category::Implementation,
            r"(?i)\b(buil[dt]\w*|ship\w*|deploy\w*|implement\w*|cod(e|ed|ing)|tool\w*|launch\w*|releas\w*)\b",
        ),
        (
            Category::ProblemSolving,
            r"(?i)\b(debug\w*|fix\w*|solv\w*|bugs?|issues?|troubleshoot\w*|investigat\w*)\b",
        ),
        (
            Category::Contribution,
            r"(?i)\b(help\w*|contribut\w*|communit\w*|impact\w*|users?|mentor\w*|teach\w*|support\w*|open[- ]source)\b",
        ),
        (
            Category::Iteration,
            r"(?i)\b(iterat\w*|refactor\w*|improv\w*|maintain\w*|stabl\w*|stability|reliab\w*|test(s|ed|ing)?|consisten\w*)\b",
        ),
    ];

    patterns
        .into_iter()
        .map(|(category, pattern)| {
            (
                category,
                Regex::new(pattern).expect("category pattern is valid"),
            )
        })
        .collect()
});

/// A recurring 1-3 word phrase and how often it appeared across all posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub token: String,
    pub count: usize,
}

/// Derived per-request evidence, discarded after the prompt is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentSummary {
    pub themes: Vec<Theme>,
    pub research_discussions: Vec<String>,
    pub methodology: Vec<String>,
    pub implementation: Vec<String>,
    pub problem_solving: Vec<String>,
    pub contributions: Vec<String>,
    pub iterations: Vec<String>,
    pub technical_depth: usize,
    pub impact_scope: usize,
    pub stability_indicators: usize,
    pub methodology_strength: usize,
}

impl ContentSummary {
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
            && self.technical_depth == 0
            && self.impact_scope == 0
            && self.stability_indicators == 0
            && self.methodology_strength == 0
    }

    fn bucket_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Research => &mut self.research_discussions,
            Category::Methodology => &mut self.methodology,
            Category::Implementation => &mut self.implementation,
            Category::ProblemSolving => &mut self.problem_solving,
            Category::Contribution => &mut self.contributions,
            Category::Iteration => &mut self.iterations,
        }
    }
}

pub fn extract_features<S: AsRef<str>>(posts: &[S]) -> ContentSummary {
    let mut summary = ContentSummary::default();

    for post in posts {
        let text = post.as_ref();
        for (category, matcher) in CATEGORY_MATCHERS.iter() {
            if matcher.is_match(text) {
                summary.bucket_mut(*category).push(text.to_string());
            }
        }
    }

    summary.themes = rank_themes(posts);
    summary.technical_depth = summary.implementation.len() + summary.problem_solving.len();
    summary.impact_scope = summary.contributions.len();
    summary.stability_indicators = summary.iterations.len();
    summary.methodology_strength =
        summary.methodology.len() + summary.research_discussions.len();

    summary
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn rank_themes<S: AsRef<str>>(posts: &[S]) -> Vec<Theme> {
    // token -> (count, first-seen order)
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut next_order = 0usize;

    for post in posts {
        let words = tokenize(post.as_ref());
        for start in 0..words.len() {
            for size in 1..=MAX_WINDOW {
                if start + size > words.len() {
                    break;
                }
                let token = words[start..start + size].join(" ");
                if token.chars().count() <= MIN_TOKEN_CHARS {
                    continue;
                }
                let entry = counts.entry(token).or_insert_with(|| {
                    next_order += 1;
                    (0, next_order)
                });
                entry.0 += 1;
            }
        }
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(token, (count, order))| (token, count, order))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(MAX_THEMES)
        .map(|(token, count, _)| Theme { token, count })
        .collect()
}
