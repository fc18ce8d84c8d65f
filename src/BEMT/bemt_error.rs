use thiserror::Error;

/// Errors raised while building or configuring a BEMT case.
///
/// Per-section convergence trouble is not an error: bisection reports it through
/// [`PhiSolution::NeedsFallback`](super::root_finding::PhiSolution) and the solver
/// recovers with the brute-force search.
#[derive(Debug, Error)]
pub enum BemtError {
    #[error("invalid configuration: field `{field}`: {reason}")]
    InvalidConfig { field: String, reason: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("task document error: {0}")]
    TaskParse(String),
    #[error("airfoil `{name}`: {reason}")]
    AirfoilData { name: String, reason: String },
    #[error("unknown sweep parameter: {0}")]
    UnknownParameter(String),
    #[error("unknown solver method: {0} (expected `bisect` or `brute`)")]
    UnknownMethod(String),
    #[error("command line: {0}")]
    Usage(String),
}

impl BemtError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        BemtError::InvalidConfig {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
