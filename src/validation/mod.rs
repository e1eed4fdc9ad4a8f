//! Gatekeeping for model replies: extraction, presence, metrics, then
//! semantic rules over the decoded result.

pub mod extract;
pub mod rules;
pub mod validator;

pub use extract::extract_json_from_response;
pub use rules::{
    DeploymentRule, FieldEvidenceRule, FieldLengthRule, RoleConsistencyRule, ValidationRule,
};
pub use validator::ResponseValidator;
