use crate::types::SurveyId;

/// Domain-level error type shared across the workspace.
///
/// Validation, not-found, and invalid-transition errors abort an operation
/// before any state mutation. Provider failures are NOT represented here:
/// adapters convert them into tagged result values at the boundary, and the
/// lifecycle engine branches on data rather than on error type.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Survey with id {0} not found")]
    NotFound(SurveyId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
