use crate::analysis::{ClassificationError, ClassificationResult};
use crate::validation::extract::extract_json_from_response;
use crate::validation::rules::{
    check_metrics, check_required_fields, DeploymentRule, FieldEvidenceRule, FieldLengthRule,
    RoleConsistencyRule, ValidationRule,
};
use serde_json::Value;
use tracing::debug;

/// Turns a raw model reply into a [`ClassificationResult`] or explains why it
/// cannot be trusted. Stateless; safe to share across tasks.
pub struct ResponseValidator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ResponseValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { rules }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn validate(&self, raw: &str) -> Result<ClassificationResult, ClassificationError> {
        let json = extract_json_from_response(raw)?;

        let value: Value = serde_json::from_str(json)
            .map_err(|e| ClassificationError::MalformedJson(e.to_string()))?;
        if !value.is_object() {
            return Err(ClassificationError::MalformedJson(
                "top-level value is not an object".to_string(),
            ));
        }

        check_required_fields(&value)?;
        check_metrics(&value)?;

        let result: ClassificationResult = serde_json::from_value(value)
            .map_err(|e| ClassificationError::MalformedJson(e.to_string()))?;

        for rule in &self.rules {
            if let Err(e) = rule.validate(&result) {
                debug!(rule = rule.name(), error = %e, "Reply rejected");
                return Err(e);
            }
        }

        Ok(result)
    }
}

impl Default for ResponseValidator {
    fn default() -> Self {
        Self {
            rules: vec![
                Box::new(FieldLengthRule),
                Box::new(FieldEvidenceRule),
                Box::new(DeploymentRule),
                Box::new(RoleConsistencyRule),
            ],
        }
    }
}
