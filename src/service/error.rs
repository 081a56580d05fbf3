//! Service Error Types

use crate::backend::BackendError;

/// Single structured error returned by every service operation
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("{operation}: queue '{queue}' already exists")]
    AlreadyExists {
        operation: &'static str,
        queue: String,
    },

    #[error("{operation}: {} not found", describe_target(.queue, .group))]
    NotFound {
        operation: &'static str,
        queue: String,
        group: Option<String>,
    },

    #[error("{operation} is not implemented")]
    NotImplemented { operation: &'static str },

    #[error("{operation} failed for {}: {source}", describe_target(.queue, .group))]
    Upstream {
        operation: &'static str,
        queue: String,
        group: Option<String>,
        #[source]
        source: BackendError,
    },
}

fn describe_target(queue: &str, group: &Option<String>) -> String {
    match group {
        Some(group) => format!("group '{}' @ queue '{}'", group, queue),
        None => format!("queue '{}'", queue),
    }
}

impl ServiceError {
    pub(crate) fn invalid(message: String) -> Self {
        ServiceError::InvalidArgument { message }
    }

    pub(crate) fn not_found(operation: &'static str, queue: &str) -> Self {
        ServiceError::NotFound {
            operation,
            queue: queue.to_string(),
            group: None,
        }
    }

    /// Wrap a collaborator failure with the operation and identifiers
    pub(crate) fn upstream(
        operation: &'static str,
        queue: &str,
        group: Option<&str>,
    ) -> impl FnOnce(BackendError) -> Self {
        let queue = queue.to_string();
        let group = group.map(str::to_string);
        move |source| ServiceError::Upstream {
            operation,
            queue,
            group,
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, ServiceError::AlreadyExists { .. })
    }
}

impl crate::core::error_handling::ContextualError for ServiceError {
    fn is_user_actionable(&self) -> bool {
        !matches!(self, ServiceError::Upstream { .. })
    }

    fn user_message(&self) -> Option<String> {
        self.is_user_actionable().then(|| self.to_string())
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
