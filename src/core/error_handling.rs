//! Generic error reporting utilities
//!
//! Lets the binary report any failed command uniformly while keeping
//! user-facing wording distinct from upstream/system detail.

/// Errors that can tell a user-actionable condition from a system failure.
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// True for conditions the caller can fix (bad name, missing queue, ...)
    fn is_user_actionable(&self) -> bool;

    /// The message to show the caller for user-actionable errors
    fn user_message(&self) -> Option<String>;
}

/// Log an error with a detail level matched to its kind.
///
/// User-actionable errors print their own message. System errors print only
/// the operation context at error level, with full detail at debug level.
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => {
            log::error!("{}: {}", operation_context, user_msg);
        }
        _ => log::error!("{} failed", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
