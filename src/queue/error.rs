//! Queue Error Types

use crate::core::error_handling::{panic_text, ContextualError};
use crate::queue::status::QueueStatus;
use std::sync::Arc;

/// Error returned by a user action or function
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Shared cause attached to processing errors and error notifications
pub type ErrorCause = Arc<dyn std::error::Error + Send + Sync>;

/// Errors surfaced to callers of queue operations
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("A predicate must be specified before the queue can start processing items")]
    NoPredicate,

    #[error("An action must be specified before the queue can start processing items")]
    NoAction,

    #[error("A function must be specified before the queue can start processing items")]
    NoFunction,

    #[error("The queue cannot be started at this time because it is in the process of cancelling")]
    CancellationRequested,

    #[error("Cannot {operation} while the queue is {status}")]
    InvalidState {
        operation: &'static str,
        status: QueueStatus,
    },

    #[error("Queue must be in the Processing or Waiting state in order to enqueue new items (current state: {status})")]
    NotAccepting { status: QueueStatus },

    #[error("{handler} cannot be empty")]
    MissingHandler { handler: &'static str },

    #[error("Item store failure: {message}")]
    Store { message: String },

    #[error("Failed to spawn worker thread '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker thread failed: {message}")]
    WorkerFailed { message: String },
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

impl ContextualError for QueueError {
    fn is_user_actionable(&self) -> bool {
        self.user_message().is_some()
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            QueueError::NoPredicate => Some("Set a predicate before starting the queue"),
            QueueError::NoAction => Some("Set an action before starting the queue"),
            QueueError::NoFunction => Some("Set a function before starting the queue"),
            QueueError::CancellationRequested => {
                Some("Wait for the queue to finish stopping before starting it again")
            }
            QueueError::InvalidState { .. } => {
                Some("The queue must be initialized or stopped before it can be started")
            }
            QueueError::NotAccepting { .. } => {
                Some("Items can only be enqueued while the queue is initialized or running")
            }
            QueueError::MissingHandler { .. } => {
                Some("Handlers cannot be cleared by assignment; use stop_callbacks for callbacks")
            }
            QueueError::Store { .. } | QueueError::Spawn { .. } | QueueError::WorkerFailed { .. } => {
                None
            }
        }
    }
}

/// Stage of the per-item pipeline that raised a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PipelineStage {
    Predicate,
    Action,
    Callback,
}

/// Failure captured by the worker while processing items
///
/// Never returned to a caller. The worker records the latest one as the
/// queue's error and broadcasts it through the error notifications.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProcessingError {
    #[error("Action failed: {source}")]
    Action {
        #[source]
        source: ErrorCause,
    },

    #[error("The {stage} panicked: {message}")]
    Panicked {
        stage: PipelineStage,
        message: String,
    },

    #[error("An error occurred while dequeuing an item for processing: {message}")]
    Dequeue { message: String },
}

impl ProcessingError {
    pub(crate) fn from_action(error: ActionError) -> Self {
        ProcessingError::Action {
            source: Arc::from(error),
        }
    }

    /// Build a panic failure from a `catch_unwind` payload
    pub(crate) fn from_panic(stage: PipelineStage, payload: Box<dyn std::any::Any + Send>) -> Self {
        ProcessingError::Panicked {
            stage,
            message: panic_text(payload.as_ref()),
        }
    }

    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            ProcessingError::Action { .. } => Some(PipelineStage::Action),
            ProcessingError::Panicked { stage, .. } => Some(*stage),
            ProcessingError::Dequeue { .. } => None,
        }
    }
}
