//! Error types for exprsql.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlError {
    /// A node combination or call shape the translator does not support.
    #[error("Unsupported construct: {0}")]
    Unsupported(String),

    /// A raw SQL fragment failed the safety check.
    #[error("Unsafe SQL fragment rejected: {reason} in {fragment:?}")]
    UnsafeFragment { fragment: String, reason: &'static str },

    /// UPDATE produced no SET assignments.
    #[error("No non-null or non-default values were provided for model '{0}'")]
    EmptyUpdate(String),

    #[error("Unknown field '{field}' on model '{model}'{}", suggestion.as_deref().map(|s| format!(". Did you mean '{s}'?")).unwrap_or_default())]
    UnknownField {
        model: String,
        field: String,
        suggestion: Option<String>,
    },

    /// Constant sub-expression could not be evaluated in memory.
    #[error("Cannot evaluate expression as a constant: {0}")]
    Eval(String),
}

impl SqlError {
    /// Create an unsupported-construct error naming the construct.
    pub fn unsupported(construct: impl Into<String>) -> Self {
        Self::Unsupported(construct.into())
    }
}

/// Result type alias for exprsql operations.
pub type SqlResult<T> = Result<T, SqlError>;
