/// Failure inside a single validator.
///
/// Never escapes the registry: it is folded into the rule's
/// `ValidationResult` with `error = true`.
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ValidatorError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failure while orchestrating a validation run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Malformed schedule: {0}")]
    MalformedSchedule(String),
}

/// Failure while handing a report to a sink.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Report already stored: {0}")]
    AlreadyExists(String),
}

/// A raw rule document that cannot be turned into rules.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("Unsupported rule document shape: expected object or array, got {0}")]
    UnsupportedShape(&'static str),
}
