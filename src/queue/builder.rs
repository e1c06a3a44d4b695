//! Builder for configured processing queues

use crate::queue::error::ActionError;
use crate::queue::handlers::{ActionFn, CallbackFn, PredicateFn};
use crate::queue::options::{QueueOptions, ThreadPriority};
use crate::queue::predicate_queue::PredicateQueue;
use std::sync::Arc;

/// Collects a name, options and handlers, then builds a [`PredicateQueue`]
///
/// Handlers left unset can still be assigned on the built queue before it
/// starts.
///
/// # Examples
/// ```
/// use itemqueue::queue::api::PredicateQueue;
///
/// let queue = PredicateQueue::<String>::builder()
///     .name("uploads")
///     .predicate(|path: &String| path.ends_with(".csv"))
///     .action(|path: &String| {
///         println!("uploading {}", path);
///         Ok(())
///     })
///     .build();
///
/// assert_eq!(queue.name(), "uploads");
/// ```
pub struct QueueBuilder<T> {
    options: QueueOptions,
    predicate: Option<PredicateFn<T>>,
    action: Option<ActionFn<T>>,
    callback: Option<CallbackFn<T>>,
}

impl<T: Send + Sync + 'static> Default for QueueBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> QueueBuilder<T> {
    pub fn new() -> Self {
        Self {
            options: QueueOptions::default(),
            predicate: None,
            action: None,
            callback: None,
        }
    }

    /// Start from options loaded elsewhere, e.g. a configuration file
    pub fn options(mut self, options: QueueOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.options.name = Some(name.into());
        self
    }

    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.options.stack_size = Some(bytes);
        self
    }

    pub fn priority(mut self, priority: ThreadPriority) -> Self {
        self.options.priority = priority;
        self
    }

    pub fn predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate) as PredicateFn<T>);
        self
    }

    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&T) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action) as ActionFn<T>);
        self
    }

    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback) as CallbackFn<T>);
        self
    }

    pub fn build(self) -> PredicateQueue<T> {
        let queue = PredicateQueue::from_options(self.options);
        queue.install_handlers(self.predicate, self.action, self.callback);
        queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::status::QueueStatus;

    #[test]
    fn test_builder_installs_handlers() {
        let queue = QueueBuilder::<u8>::new()
            .name("built")
            .priority(ThreadPriority::Low)
            .predicate(|_| true)
            .action(|_| Ok(()))
            .callback(|_| {})
            .build();

        assert_eq!(queue.name(), "built");
        assert!(queue.has_callback());
        assert_eq!(queue.status(), QueueStatus::Initialized);
        assert!(queue.start().is_ok());
        assert!(queue.stop(true).is_ok());
    }

    #[test]
    fn test_builder_without_handlers_cannot_start() {
        let queue = QueueBuilder::<u8>::new().build();
        assert!(queue.start().is_err());
        assert_eq!(queue.name().len(), 32);
    }

    #[test]
    fn test_builder_accepts_loaded_options() {
        let options = QueueOptions::with_name("from-config");
        let queue = QueueBuilder::<u8>::new().options(options).stack_size(128 * 1024).build();
        assert_eq!(queue.name(), "from-config");
    }
}
