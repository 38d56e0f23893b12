#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// A required flag is empty, or a selection is not one of the declared options.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The action's transform rejected the flags.
    #[error("Preparation failed: {0}")]
    Preparation(String),

    /// The backend call failed or returned a non-success status.
    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
