use crate::llm::BackendError;
use std::fmt;
use thiserror::Error;

/// Why a deployment verdict was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentIssue {
    BadLength { length: usize, min: usize, max: usize },
    UnknownDivision,
    UnknownRole(u8),
    RoleMismatch { role: String, division: String },
}

impl fmt::Display for DeploymentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentIssue::BadLength { length, min, max } => write!(
                f,
                "verdict is {} characters, expected {}-{}",
                length, min, max
            ),
            DeploymentIssue::UnknownDivision => {
                write!(f, "verdict does not start with a known division prefix")
            }
            DeploymentIssue::UnknownRole(t) => {
                write!(f, "spectralType {} does not name a role", t)
            }
            DeploymentIssue::RoleMismatch { role, division } => {
                write!(f, "{} is not allowed in the {}", role, division)
            }
        }
    }
}

/// Errors produced by one classification call.
///
/// Every variant except [`ClassificationError::ClassificationFailed`] is
/// retried by the classifier; only the terminal variant leaves `classify`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassificationError {
    #[error("Transport error: {0}")]
    Transport(#[from] BackendError),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Malformed JSON in model response: {0}")]
    MalformedJson(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid metric {metric}: {reason}")]
    InvalidMetric { metric: String, reason: String },

    #[error("Invalid length for {field}: {length} characters (expected {min}-{max})")]
    InvalidLength {
        field: String,
        length: usize,
        min: usize,
        max: usize,
    },

    #[error("Invalid field evidence: {0}")]
    InvalidEvidence(String),

    #[error("Invalid deployment: {0}")]
    InvalidDeployment(DeploymentIssue),

    #[error("Role consistency check failed: assigned {assigned}, text points to {}", .conflicting.join(", "))]
    RoleConsistency {
        assigned: String,
        conflicting: Vec<String>,
    },

    #[error("Classification failed after {attempts} attempts: {source}")]
    ClassificationFailed {
        attempts: u32,
        #[source]
        source: Box<ClassificationError>,
    },
}

impl ClassificationError {
    /// Stable name of the error variant, suitable for logs and metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            ClassificationError::Transport(_) => "TransportError",
            ClassificationError::EmptyResponse => "EmptyResponseError",
            ClassificationError::MalformedJson(_) => "MalformedJsonError",
            ClassificationError::MissingField(_) => "MissingFieldError",
            ClassificationError::InvalidMetric { .. } => "InvalidMetricError",
            ClassificationError::InvalidLength { .. } => "InvalidLengthError",
            ClassificationError::InvalidEvidence(_) => "InvalidEvidenceError",
            ClassificationError::InvalidDeployment(_) => "InvalidDeploymentError",
            ClassificationError::RoleConsistency { .. } => "RoleConsistencyError",
            ClassificationError::ClassificationFailed { .. } => "ClassificationFailedError",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ClassificationError::ClassificationFailed { .. })
    }

    /// The underlying cause for a terminal error, `self` otherwise
    pub fn last_cause(&self) -> &ClassificationError {
        match self {
            ClassificationError::ClassificationFailed { source, .. } => source.as_ref(),
            other => other,
        }
    }

    pub(crate) fn exhausted(attempts: u32, last: ClassificationError) -> Self {
        ClassificationError::ClassificationFailed {
            attempts,
            source: Box::new(last),
        }
    }
}
