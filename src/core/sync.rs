//! Lock-poison handling for the std mutexes used by in-process stores

use std::sync::LockResult;

/// Convert a poisoned lock into an application error.
///
/// A poisoned lock means a panic happened while it was held; the protected
/// state may be half-updated, so callers surface an error instead of
/// continuing with `into_inner()`.
///
/// ```
/// use std::sync::Mutex;
/// use queuegate::core::sync::handle_mutex_poison;
///
/// let topics = Mutex::new(vec!["orders".to_string()]);
/// let guard = handle_mutex_poison(topics.lock(), |msg| msg).unwrap();
/// assert_eq!(guard.len(), 1);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (lock poisoned). A panic occurred while holding a lock. PoisonError: {:?}",
            poison_err
        ))
    })
}
