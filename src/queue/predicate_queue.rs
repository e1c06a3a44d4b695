//! Predicate-filtered processing queue

use crate::core::error_handling::panic_text;
use crate::core::sync::recover_poison;
use crate::notifications::api::{
    EventFilter, EventReceiver, NotificationManager, QueueEvent, Subscriber,
};
use crate::queue::builder::QueueBuilder;
use crate::queue::error::{ActionError, ErrorCause, ProcessingError, QueueError, QueueResult};
use crate::queue::handlers::{ActionFn, CallbackFn, PredicateFn};
use crate::queue::options::{resolve_name, QueueOptions, StartOptions};
use crate::queue::shared::SharedQueue;
use crate::queue::signal::{completion, CancellationToken, CompletionReceiver};
use crate::queue::status::{QueueState, QueueStatus};
use crate::queue::store::Rejected;
use crate::queue::worker;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

struct WorkerHandle {
    thread: JoinHandle<()>,
    token: CancellationToken,
    finished: CompletionReceiver,
}

impl WorkerHandle {
    fn is_current_thread(&self) -> bool {
        self.thread.thread().id() == thread::current().id()
    }
}

/// A queue that filters every item through a predicate before its action
///
/// Items are enqueued from any thread and processed in order by a single
/// worker thread. Every operation takes `&self`; share the queue between
/// threads as `Arc<PredicateQueue<T>>`. Dropping the queue disposes it,
/// which drains the remaining items first.
///
/// # Examples
/// ```
/// use itemqueue::queue::api::PredicateQueue;
/// use std::sync::atomic::{AtomicI64, Ordering};
/// use std::sync::Arc;
///
/// let sum = Arc::new(AtomicI64::new(0));
/// let total = Arc::clone(&sum);
///
/// let queue = PredicateQueue::with_name("evens");
/// queue.set_predicate(Some(|v: &i64| v % 2 == 0)).unwrap();
/// queue
///     .set_action(Some(move |v: &i64| {
///         total.fetch_add(*v, Ordering::SeqCst);
///         Ok(())
///     }))
///     .unwrap();
///
/// queue.start().unwrap();
/// queue.enqueue_many(0..=10).unwrap();
/// queue.stop(true).unwrap();
///
/// assert_eq!(sum.load(Ordering::SeqCst), 30);
/// ```
pub struct PredicateQueue<T: Send + Sync + 'static> {
    shared: Arc<SharedQueue<T>>,
    options: QueueOptions,
    worker: Mutex<Option<WorkerHandle>>,
}

impl<T: Send + Sync + 'static> Default for PredicateQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> PredicateQueue<T> {
    /// Create a queue with a generated name
    pub fn new() -> Self {
        Self::from_options(QueueOptions::default())
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self::from_options(QueueOptions::with_name(name))
    }

    pub fn from_options(options: QueueOptions) -> Self {
        let name = resolve_name(options.name.as_deref());
        log::debug!("Queue '{}' created", name);
        Self {
            shared: Arc::new(SharedQueue::new(Arc::from(name))),
            options,
            worker: Mutex::new(None),
        }
    }

    pub fn builder() -> QueueBuilder<T> {
        QueueBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn status(&self) -> QueueStatus {
        self.shared.state.status()
    }

    /// Status, cancellation flag and last error read together
    pub fn state(&self) -> QueueState {
        self.shared.state.snapshot()
    }

    pub fn is_cancellation_requested(&self) -> bool {
        self.shared.state.cancellation_requested()
    }

    /// Advisory count of items waiting to be processed
    pub fn items_in_queue(&self) -> usize {
        self.shared.store.len().unwrap_or(0)
    }

    /// The last processing failure, kept until restart or `clear_error`
    pub fn error(&self) -> Option<ProcessingError> {
        self.shared.state.error()
    }

    pub fn clear_error(&self) {
        self.shared.state.clear_error();
    }

    /// Replace the predicate; the next dequeued item uses the new one
    ///
    /// `None` is rejected and the current predicate stays in effect.
    pub fn set_predicate<F>(&self, predicate: Option<F>) -> QueueResult<()>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.shared
            .handlers
            .set_predicate(predicate.map(|f| Arc::new(f) as PredicateFn<T>))
    }

    /// Replace the action; `None` is rejected
    pub fn set_action<F>(&self, action: Option<F>) -> QueueResult<()>
    where
        F: Fn(&T) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.shared
            .handlers
            .set_action(action.map(|f| Arc::new(f) as ActionFn<T>))
    }

    /// Replace the callback run after each successful action; `None` is rejected
    pub fn set_callback<F>(&self, callback: Option<F>) -> QueueResult<()>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.shared
            .handlers
            .set_callback(callback.map(|f| Arc::new(f) as CallbackFn<T>))
    }

    pub(crate) fn install_handlers(
        &self,
        predicate: Option<PredicateFn<T>>,
        action: Option<ActionFn<T>>,
        callback: Option<CallbackFn<T>>,
    ) {
        let handlers = &self.shared.handlers;
        if let Some(predicate) = predicate {
            handlers.replace_predicate(predicate);
        }
        if let Some(action) = action {
            handlers.replace_action(action);
        }
        if let Some(callback) = callback {
            handlers.replace_callback(callback);
        }
    }

    /// Stop invoking the callback for items processed from now on
    pub fn stop_callbacks(&self) {
        self.shared.handlers.clear_callback();
    }

    pub fn has_callback(&self) -> bool {
        self.shared.handlers.has_callback()
    }

    /// Add one item to the tail of the queue
    ///
    /// Accepted while the queue is initialized or running. Items enqueued
    /// before the first start wait for the worker.
    pub fn enqueue(&self, item: T) -> QueueResult<()> {
        self.check_accepting()?;
        self.shared
            .store
            .push(item)
            .map_err(|rejected| self.store_fault(rejected))?;
        self.shared.wake.raise();
        Ok(())
    }

    /// Add a batch of items contiguously, in iteration order
    ///
    /// Returns the number of items added. No items are rolled back if the
    /// store fails part way.
    pub fn enqueue_many<I>(&self, items: I) -> QueueResult<usize>
    where
        I: IntoIterator<Item = T>,
    {
        self.check_accepting()?;
        let added = self
            .shared
            .store
            .push_many(items)
            .map_err(|rejected| self.store_fault(rejected))?;
        if added > 0 {
            self.shared.wake.raise();
        }
        Ok(added)
    }

    fn check_accepting(&self) -> QueueResult<()> {
        let status = self.status();
        if !status.accepts_items() {
            return Err(QueueError::NotAccepting { status });
        }
        Ok(())
    }

    fn store_fault(&self, rejected: Rejected<T>) -> QueueError {
        let message = format!("An error occurred while enqueuing an item: {}", rejected.message);
        self.shared.report_error(None, message, None);
        QueueError::Store {
            message: rejected.message,
        }
    }

    /// Start the worker with the queue's configured options
    pub fn start(&self) -> QueueResult<()> {
        self.start_with(self.options.start_options())
    }

    /// Start the worker thread
    ///
    /// Valid from `Initialized` or `Stopped`, with a predicate and an action
    /// set. A restart clears the previous run's error.
    pub fn start_with(&self, options: StartOptions) -> QueueResult<()> {
        let shared = &self.shared;
        if !shared.handlers.has_predicate() {
            return Err(QueueError::NoPredicate);
        }
        if !shared.handlers.has_action() {
            return Err(QueueError::NoAction);
        }
        if shared.state.cancellation_requested() {
            return Err(QueueError::CancellationRequested);
        }

        // Gate before worker lock: a subscriber may call back into start
        let _emitting = shared.hold_emission();
        let mut worker = recover_poison(self.worker.lock());
        let status = self.status();
        if !status.can_start() || worker.is_some() {
            return Err(QueueError::InvalidState {
                operation: "start",
                status,
            });
        }

        if status == QueueStatus::Stopped {
            shared.state.clear_error();
        }
        shared.transition(QueueStatus::Starting);

        let token = CancellationToken::new();
        let (sender, finished) = completion();
        let mut builder = thread::Builder::new().name(shared.name.to_string());
        if let Some(stack_size) = options.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let worker_shared = Arc::clone(shared);
        let worker_token = token.clone();
        match builder.spawn(move || worker::run(worker_shared, worker_token, sender)) {
            Ok(thread) => {
                log::debug!(
                    "Queue '{}' started (priority: {}, stack size: {:?})",
                    shared.name,
                    options.priority,
                    options.stack_size
                );
                *worker = Some(WorkerHandle {
                    thread,
                    token,
                    finished,
                });
                Ok(())
            }
            Err(source) => {
                let message = format!("Failed to start the worker thread: {}", source);
                let cause: ErrorCause =
                    Arc::new(std::io::Error::new(source.kind(), source.to_string()));
                shared.report_error(None, message, Some(cause));
                shared.transition(status);
                Err(QueueError::Spawn {
                    name: shared.name.to_string(),
                    source,
                })
            }
        }
    }

    /// Stop the worker and wait for it to finish
    ///
    /// With `process_remaining` every queued item is offered to the pipeline
    /// before this returns; otherwise queued items are discarded. Stopping
    /// a queue that is not running is a successful no-op.
    pub fn stop(&self, process_remaining: bool) -> QueueResult<()> {
        let status = self.status();
        if status.is_stop_noop()
            || status == QueueStatus::Cancelling
            || self.is_cancellation_requested()
        {
            log::trace!("Queue '{}' stop ignored while {}", self.name(), status);
            return Ok(());
        }

        let handle = {
            let mut worker = recover_poison(self.worker.lock());
            if worker.as_ref().is_some_and(WorkerHandle::is_current_thread) {
                return Err(QueueError::InvalidState {
                    operation: "stop from the worker thread",
                    status,
                });
            }
            worker.take()
        };
        let Some(handle) = handle else {
            return Ok(());
        };

        log::debug!(
            "Queue '{}' stopping ({})",
            self.name(),
            if process_remaining { "drain" } else { "discard" }
        );
        self.shared.transition(QueueStatus::Stopping);
        self.finish_worker(handle, process_remaining, QueueStatus::Stopped)
    }

    /// Stop the queue for good, processing remaining items first
    ///
    /// Idempotent. Items enqueued before a start that never happened are
    /// discarded.
    pub fn dispose(&self) -> QueueResult<()> {
        let status = self.status();
        if matches!(status, QueueStatus::Disposing | QueueStatus::Disposed) {
            return Ok(());
        }

        let handle = {
            let mut worker = recover_poison(self.worker.lock());
            if worker.as_ref().is_some_and(WorkerHandle::is_current_thread) {
                return Err(QueueError::InvalidState {
                    operation: "dispose from the worker thread",
                    status,
                });
            }
            worker.take()
        };

        self.shared.transition(QueueStatus::Disposing);
        let result = match handle {
            Some(handle) => self.finish_worker(handle, true, QueueStatus::Disposed),
            None => {
                self.shared.transition(QueueStatus::Disposed);
                Ok(())
            }
        };

        match self.shared.store.discard_all() {
            Ok(0) => {}
            Ok(discarded) => log::debug!(
                "Queue '{}' discarded {} item(s) on dispose",
                self.name(),
                discarded
            ),
            Err(message) => self.shared.report_error(None, message, None),
        }
        log::debug!("Queue '{}' disposed", self.name());
        result
    }

    /// Cancel the worker, wait for its final pass and settle on `final_status`
    fn finish_worker(
        &self,
        handle: WorkerHandle,
        drain: bool,
        final_status: QueueStatus,
    ) -> QueueResult<()> {
        let WorkerHandle {
            thread,
            token,
            finished,
        } = handle;
        let shared = &self.shared;

        shared.change_status(|state| state.request_cancellation(|| token.cancel(drain)));
        shared.wake.raise();

        let completed = finished.wait();
        let joined = thread.join();
        shared.change_status(|state| state.complete_cancellation(final_status));

        let failure = match (joined, completed) {
            (Err(payload), _) => Some(format!(
                "worker thread panicked: {}",
                panic_text(payload.as_ref())
            )),
            (Ok(()), Err(message)) => Some(message),
            (Ok(()), Ok(())) => None,
        };

        match failure {
            None => {
                log::debug!("Queue '{}' is {}", self.name(), final_status);
                Ok(())
            }
            Some(message) => {
                shared.report_error(None, message.clone(), None);
                Err(QueueError::WorkerFailed { message })
            }
        }
    }

    /// Register a subscriber for this queue's events
    pub fn subscribe(
        &self,
        subscriber_id: impl Into<String>,
        filter: EventFilter,
        source: impl Into<String>,
        subscriber: Arc<dyn Subscriber<T>>,
    ) {
        self.shared
            .notifications
            .subscribe(subscriber_id, filter, source, subscriber);
    }

    /// Register a closure for this queue's events
    ///
    /// The closure runs on the worker thread for processing events and on
    /// the calling thread for start and stop transitions.
    pub fn subscribe_fn<F>(
        &self,
        subscriber_id: impl Into<String>,
        filter: EventFilter,
        source: impl Into<String>,
        handler: F,
    ) where
        F: Fn(&QueueEvent<T>) + Send + Sync + 'static,
    {
        self.shared
            .notifications
            .subscribe_fn(subscriber_id, filter, source, handler);
    }

    pub fn subscribe_channel(
        &self,
        subscriber_id: impl Into<String>,
        filter: EventFilter,
        source: impl Into<String>,
    ) -> EventReceiver<T> {
        self.shared
            .notifications
            .subscribe_channel(subscriber_id, filter, source)
    }

    pub fn unsubscribe(&self, subscriber_id: &str) -> bool {
        self.shared.notifications.unsubscribe(subscriber_id)
    }

    pub fn notifications(&self) -> &NotificationManager<T> {
        &self.shared.notifications
    }

    /// Ask the worker to exit without waiting for it
    fn detach_worker(&self) {
        if let Some(handle) = recover_poison(self.worker.lock()).take() {
            handle.token.cancel(false);
            self.shared.wake.raise();
            log::warn!(
                "Queue '{}' dropped on its own worker thread; worker detached",
                self.name()
            );
        }
    }
}

impl<T: Send + Sync + 'static> Drop for PredicateQueue<T> {
    fn drop(&mut self) {
        let on_worker = recover_poison(self.worker.lock())
            .as_ref()
            .is_some_and(WorkerHandle::is_current_thread);
        if on_worker {
            self.detach_worker();
            return;
        }
        if let Err(e) = self.dispose() {
            log::warn!("Queue '{}' failed to dispose cleanly: {}", self.name(), e);
        }
    }
}
