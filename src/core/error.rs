//! Domain error types
//!
//! Ports and adapters speak `anyhow`; services convert into [`SurveyError`]
//! so callers can tell a missing record from a broken store.

use thiserror::Error;

/// Errors raised by survey services
#[derive(Debug, Error)]
pub enum SurveyError {
    /// Record absent, or owned by another surveyor
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record ("student", "expense", ...)
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Uniqueness constraint violated
    #[error("conflict: {0}")]
    Conflict(String),

    /// Request cannot be served as given
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be applied
    #[error("configuration error: {0}")]
    Config(String),

    /// Store failure
    #[error(transparent)]
    Store(anyhow::Error),
}

impl SurveyError {
    /// Build a not-found error for a numeric id
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<anyhow::Error> for SurveyError {
    fn from(err: anyhow::Error) -> Self {
        // Adapters raise SurveyError through anyhow; get it back out intact
        match err.downcast::<Self>() {
            Ok(survey) => survey,
            Err(other) => Self::Store(other),
        }
    }
}

/// Result alias for survey services
pub type SurveyResult<T> = Result<T, SurveyError>;
