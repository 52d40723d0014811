use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Fatal for a single patent; the rest of the batch keeps going.
    #[error("malformed input for patent {patent_id}: {reason}")]
    MalformedInput { patent_id: String, reason: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("workflow transition error: {0}")]
    WorkflowTransition(String),

    #[error("determinism violation: {0}")]
    DeterminismViolation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub fn malformed(patent_id: &str, reason: impl Into<String>) -> Self {
        CoreError::MalformedInput {
            patent_id: patent_id.to_string(),
            reason: reason.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
