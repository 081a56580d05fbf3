//! Application Error Types

use crate::app::cli::config::ConfigError;
use crate::backend::BackendError;
use crate::core::error_handling::ContextualError;
use crate::service::api::ServiceError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("state file: {0}")]
    State(#[from] BackendError),

    #[error("no message for {queue}@{group} within {seconds}s")]
    ReceiveTimeout {
        queue: String,
        group: String,
        seconds: u64,
    },

    #[error("cannot encode output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl ContextualError for AppError {
    fn is_user_actionable(&self) -> bool {
        match self {
            AppError::Config(_) | AppError::ReceiveTimeout { .. } => true,
            AppError::Service(e) => e.is_user_actionable(),
            AppError::State(_) | AppError::Output(_) | AppError::Logging(_) => false,
        }
    }

    fn user_message(&self) -> Option<String> {
        match self {
            AppError::Service(e) => e.user_message(),
            _ => self.is_user_actionable().then(|| self.to_string()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
