//! Generic error handling utilities
//!
//! Provides unified error reporting across the queue, notification and
//! configuration error types.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// Configuration and state errors (a missing action, enqueueing into a stopped
/// queue) are user-actionable and carry a message worth showing verbatim.
/// System errors (a poisoned lock, a failed thread spawn) are reported with
/// generic context and their details go to the debug log.
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error contains a specific, user-actionable message
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log errors with a detail level based on error specificity
///
/// # Examples
/// ```rust,no_run
/// # use itemqueue::core::error_handling::log_error_with_context;
/// # use itemqueue::queue::api::QueueError;
/// let error = QueueError::NoAction;
/// log_error_with_context(&error, "Starting queue");
/// // Logs: "FATAL: An action must be specified before the queue can start processing items"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => {
            log::error!("FATAL: {}", user_msg);
        }
        _ => {
            log::error!("FATAL: {}", operation_context);
        }
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Text of a panic payload caught with `catch_unwind`
pub fn panic_text(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
