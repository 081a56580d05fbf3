//! Collaborator Error Types

/// Failure reported by a broker, metadata store, transport or metrics backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("session closed: {0}")]
    Closed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for collaborator calls
pub type BackendResult<T> = Result<T, BackendError>;
