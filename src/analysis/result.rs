//! The validated classification contract handed back to callers

use crate::taxonomy::{division_from_verdict, role_by_type, Division, Role};
use serde::{Deserialize, Serialize};

/// Character-length bounds for one reply field.
///
/// `prompt_max` is what the model is asked for; `max` is what the validator
/// accepts, leaving headroom for models that overshoot slightly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBounds {
    pub field: &'static str,
    pub min: usize,
    pub prompt_max: usize,
    pub max: usize,
}

impl LengthBounds {
    pub fn contains(&self, length: usize) -> bool {
        (self.min..=self.max).contains(&length)
    }
}

pub const CORE_IDENTITY: LengthBounds = LengthBounds {
    field: "researchProfile.coreIdentity",
    min: 100,
    prompt_max: 600,
    max: 800,
};

pub const FUNCTIONAL_IMPACT: LengthBounds = LengthBounds {
    field: "researchProfile.functionalImpact",
    min: 100,
    prompt_max: 600,
    max: 600,
};

pub const STABILITY_WARNING: LengthBounds = LengthBounds {
    field: "researchProfile.stabilityWarning",
    min: 100,
    prompt_max: 500,
    max: 600,
};

pub const VERDICT: LengthBounds = LengthBounds {
    field: "researchProfile.researchDeployment.verdict",
    min: 100,
    prompt_max: 600,
    max: 600,
};

pub const EVIDENCE_ANALYSIS: LengthBounds = LengthBounds {
    field: "researchProfile.fieldEvidence[].analysis",
    min: 0,
    prompt_max: 150,
    max: 150,
};

pub const METRIC_CONTEXT: LengthBounds = LengthBounds {
    field: "researchProfile.researchDeployment.metrics[].context",
    min: 20,
    prompt_max: 100,
    max: 100,
};

pub const MIN_EVIDENCE_ITEMS: usize = 2;
pub const MAX_EVIDENCE_ITEMS: usize = 3;

/// JSON keys of the four deployment metrics, in prompt order
pub const METRIC_NAMES: [&str; 4] = [
    "technicalDepth",
    "impactScope",
    "stabilityIndex",
    "methodologyStrength",
];

pub const MIN_METRIC_SCORE: u8 = 1;
pub const MAX_METRIC_SCORE: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub spectral_type: u8,
    pub research_profile: ResearchProfile,
}

impl ClassificationResult {
    pub fn role(&self) -> Option<&'static Role> {
        role_by_type(self.spectral_type)
    }

    /// Division named by the verdict prefix
    pub fn division(&self) -> Option<&'static Division> {
        division_from_verdict(&self.research_profile.research_deployment.verdict)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchProfile {
    pub core_identity: String,
    pub functional_impact: String,
    pub stability_warning: String,
    pub research_deployment: ResearchDeployment,
    pub field_evidence: Vec<FieldEvidence>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchDeployment {
    pub verdict: String,
    pub metrics: DeploymentMetrics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeploymentMetrics {
    pub technical_depth: Metric,
    pub impact_scope: Metric,
    pub stability_index: Metric,
    pub methodology_strength: Metric,
}

impl DeploymentMetrics {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Metric)> {
        METRIC_NAMES.into_iter().zip([
            &self.technical_depth,
            &self.impact_scope,
            &self.stability_index,
            &self.methodology_strength,
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub score: u8,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEvidence {
    pub observation: String,
    pub analysis: String,
}

/// Length in characters, the unit every bound above is expressed in
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
