use crate::analysis::result::{
    char_len, ClassificationResult, LengthBounds, CORE_IDENTITY, EVIDENCE_ANALYSIS,
    FUNCTIONAL_IMPACT, MAX_EVIDENCE_ITEMS, MAX_METRIC_SCORE, METRIC_CONTEXT, METRIC_NAMES,
    MIN_EVIDENCE_ITEMS, MIN_METRIC_SCORE, STABILITY_WARNING, VERDICT,
};
use crate::analysis::{ClassificationError, DeploymentIssue};
use crate::taxonomy::{division_from_verdict, role_by_name, role_by_type, Role, ROLES};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Presence gate over the raw reply, before it is decoded.
pub fn check_required_fields(reply: &Value) -> Result<(), ClassificationError> {
    require(reply, "spectralType")?;
    let profile = require(reply, "researchProfile")?;

    for field in [
        "coreIdentity",
        "functionalImpact",
        "stabilityWarning",
        "researchDeployment",
        "fieldEvidence",
    ] {
        require_in(profile, "researchProfile", field)?;
    }

    let deployment = &profile["researchDeployment"];
    require_in(deployment, "researchProfile.researchDeployment", "verdict")?;

    Ok(())
}

fn require<'a>(value: &'a Value, field: &str) -> Result<&'a Value, ClassificationError> {
    match value.get(field) {
        Some(v) if !v.is_null() => Ok(v),
        _ => Err(ClassificationError::MissingField(field.to_string())),
    }
}

fn require_in<'a>(
    value: &'a Value,
    parent: &str,
    field: &str,
) -> Result<&'a Value, ClassificationError> {
    match value.get(field) {
        Some(v) if !v.is_null() => Ok(v),
        _ => Err(ClassificationError::MissingField(format!(
            "{}.{}",
            parent, field
        ))),
    }
}

/// Metric gate: exactly the four named metrics, each with an integral
/// score in range and a string context of acceptable length.
pub fn check_metrics(reply: &Value) -> Result<(), ClassificationError> {
    let invalid = |metric: &str, reason: String| ClassificationError::InvalidMetric {
        metric: metric.to_string(),
        reason,
    };

    let metrics = reply
        .pointer("/researchProfile/researchDeployment/metrics")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid("metrics", "metrics object is missing".to_string()))?;

    for name in METRIC_NAMES {
        let metric = metrics
            .get(name)
            .ok_or_else(|| invalid(name, "metric is missing".to_string()))?;

        let score = metric
            .get("score")
            .ok_or_else(|| invalid(name, "score is missing".to_string()))?;
        match score.as_u64() {
            Some(s) if (u64::from(MIN_METRIC_SCORE)..=u64::from(MAX_METRIC_SCORE)).contains(&s) => {}
            Some(s) => {
                return Err(invalid(
                    name,
                    format!(
                        "score {} outside {}-{}",
                        s, MIN_METRIC_SCORE, MAX_METRIC_SCORE
                    ),
                ))
            }
            None if score.is_number() => {
                return Err(invalid(
                    name,
                    format!(
                        "score {} is not an integer in {}-{}",
                        score, MIN_METRIC_SCORE, MAX_METRIC_SCORE
                    ),
                ))
            }
            None => return Err(invalid(name, "score is not a number".to_string())),
        }

        let context = metric
            .get("context")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid(name, "context is missing or not a string".to_string()))?;
        let length = char_len(context);
        if !METRIC_CONTEXT.contains(length) {
            return Err(invalid(
                name,
                format!(
                    "context is {} characters, expected {}-{}",
                    length, METRIC_CONTEXT.min, METRIC_CONTEXT.max
                ),
            ));
        }
    }

    if let Some(extra) = metrics.keys().find(|k| !METRIC_NAMES.contains(&k.as_str())) {
        return Err(invalid(extra, "unexpected metric".to_string()));
    }

    Ok(())
}

/// A gate applied to a decoded reply.
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, result: &ClassificationResult) -> Result<(), ClassificationError>;
}

fn check_length(text: &str, bounds: &LengthBounds) -> Result<(), ClassificationError> {
    let length = char_len(text);
    if bounds.contains(length) {
        Ok(())
    } else {
        Err(ClassificationError::InvalidLength {
            field: bounds.field.to_string(),
            length,
            min: bounds.min,
            max: bounds.max,
        })
    }
}

pub struct FieldLengthRule;

impl ValidationRule for FieldLengthRule {
    fn name(&self) -> &'static str {
        "FieldLength"
    }

    fn validate(&self, result: &ClassificationResult) -> Result<(), ClassificationError> {
        let profile = &result.research_profile;
        check_length(&profile.core_identity, &CORE_IDENTITY)?;
        check_length(&profile.functional_impact, &FUNCTIONAL_IMPACT)?;
        check_length(&profile.stability_warning, &STABILITY_WARNING)?;
        Ok(())
    }
}

pub struct FieldEvidenceRule;

impl ValidationRule for FieldEvidenceRule {
    fn name(&self) -> &'static str {
        "FieldEvidence"
    }

    fn validate(&self, result: &ClassificationResult) -> Result<(), ClassificationError> {
        let evidence = &result.research_profile.field_evidence;
        if !(MIN_EVIDENCE_ITEMS..=MAX_EVIDENCE_ITEMS).contains(&evidence.len()) {
            return Err(ClassificationError::InvalidEvidence(format!(
                "expected {}-{} items, got {}",
                MIN_EVIDENCE_ITEMS,
                MAX_EVIDENCE_ITEMS,
                evidence.len()
            )));
        }

        for (i, item) in evidence.iter().enumerate() {
            if item.observation.trim().is_empty() {
                return Err(ClassificationError::InvalidEvidence(format!(
                    "fieldEvidence[{}] has an empty observation",
                    i
                )));
            }
            check_length(&item.analysis, &EVIDENCE_ANALYSIS)?;
        }
        Ok(())
    }
}

/// Verdict length, division prefix and role/division membership.
pub struct DeploymentRule;

impl ValidationRule for DeploymentRule {
    fn name(&self) -> &'static str {
        "Deployment"
    }

    fn validate(&self, result: &ClassificationResult) -> Result<(), ClassificationError> {
        let verdict = &result.research_profile.research_deployment.verdict;

        let length = char_len(verdict);
        if !VERDICT.contains(length) {
            return Err(ClassificationError::InvalidDeployment(
                DeploymentIssue::BadLength {
                    length,
                    min: VERDICT.min,
                    max: VERDICT.max,
                },
            ));
        }

        let division = division_from_verdict(verdict).ok_or(
            ClassificationError::InvalidDeployment(DeploymentIssue::UnknownDivision),
        )?;

        let role = assigned_role(result)?;

        if !division.allows(role.spectral_type) {
            return Err(ClassificationError::InvalidDeployment(
                DeploymentIssue::RoleMismatch {
                    role: role.name.to_string(),
                    division: division.name.to_string(),
                },
            ));
        }
        Ok(())
    }
}

fn assigned_role(result: &ClassificationResult) -> Result<&'static Role, ClassificationError> {
    role_by_type(result.spectral_type).ok_or(ClassificationError::InvalidDeployment(
        DeploymentIssue::UnknownRole(result.spectral_type),
    ))
}

static ROLE_CLAIM: Lazy<Regex> = Lazy::new(|| {
    let names = ROLES
        .iter()
        .map(|r| regex::escape(r.name))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\bas an? ({})\b", names)).expect("role claim pattern is valid")
});

/// Heuristic drift detector between the assigned role and the narrative.
///
/// Fails when the verdict claims another role ("As a Toolsmith, ...") or
/// when another role's keywords outnumber the assigned role's in
/// `coreIdentity`. False positives are accepted.
pub struct RoleConsistencyRule;

impl RoleConsistencyRule {
    fn claimed_roles(verdict: &str, assigned: &Role) -> Vec<&'static str> {
        ROLE_CLAIM
            .captures_iter(verdict)
            .filter_map(|c| c.get(1))
            .filter_map(|m| role_by_name(m.as_str()))
            .filter(|r| r.spectral_type != assigned.spectral_type)
            .map(|r| r.name)
            .collect()
    }

    fn outscoring_roles(core_identity: &str, assigned: &Role) -> Vec<&'static str> {
        let assigned_hits = assigned.keyword_hits(core_identity);
        ROLES
            .iter()
            .filter(|r| r.spectral_type != assigned.spectral_type)
            .filter(|r| r.keyword_hits(core_identity) > assigned_hits)
            .map(|r| r.name)
            .collect()
    }
}

impl ValidationRule for RoleConsistencyRule {
    fn name(&self) -> &'static str {
        "RoleConsistency"
    }

    fn validate(&self, result: &ClassificationResult) -> Result<(), ClassificationError> {
        let role = assigned_role(result)?;
        let profile = &result.research_profile;

        let mut conflicting = Self::claimed_roles(&profile.research_deployment.verdict, role);
        for name in Self::outscoring_roles(&profile.core_identity, role) {
            if !conflicting.contains(&name) {
                conflicting.push(name);
            }
        }

        if conflicting.is_empty() {
            return Ok(());
        }

        Err(ClassificationError::RoleConsistency {
            assigned: role.name.to_string(),
            conflicting: conflicting.into_iter().map(String::from).collect(),
        })
    }
}
