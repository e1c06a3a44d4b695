//! Public API for the queue system
//!
//! External modules should import from here rather than directly from
//! internal modules. See the module documentation for usage examples and
//! architecture details.

// Processing queues
pub use crate::queue::action_queue::ActionQueue;
pub use crate::queue::function_queue::{FunctionFn, FunctionQueue, ResultCallbackFn};
pub use crate::queue::predicate_queue::PredicateQueue;

// Construction and configuration
pub use crate::queue::builder::QueueBuilder;
pub use crate::queue::options::{QueueOptions, StartOptions, ThreadPriority};

// Handler types
pub use crate::queue::handlers::{ActionFn, CallbackFn, PredicateFn};

// Lifecycle state
pub use crate::queue::status::{QueueState, QueueStatus};

// Error handling
pub use crate::queue::error::{
    ActionError, ErrorCause, PipelineStage, ProcessingError, QueueError, QueueResult,
};
