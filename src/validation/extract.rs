use crate::analysis::ClassificationError;
use once_cell::sync::Lazy;
use regex::Regex;

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```(?:json|JSON)?\s*\n?([\s\S]*?)\n?```").expect("fence pattern is valid")
});

/// Pulls the JSON object out of a model reply.
///
/// Accepts a bare object, a fenced markdown block, or falls back to the
/// span between the first `{` and the last `}`.
pub fn extract_json_from_response(response: &str) -> Result<&str, ClassificationError> {
    let trimmed = response.trim();

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Ok(trimmed);
    }

    if trimmed.contains("```") {
        if let Some(json) = FENCED_BLOCK
            .captures(trimmed)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .filter(|j| j.starts_with('{') && j.ends_with('}'))
        {
            return Ok(json);
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return Ok(&trimmed[start..=end]);
        }
    }

    Err(ClassificationError::MalformedJson(
        "No JSON object found in response".to_string(),
    ))
}
