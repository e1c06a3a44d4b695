//! Processing queue without filtering

use crate::notifications::api::{EventFilter, EventReceiver, QueueEvent, Subscriber};
use crate::queue::error::{ActionError, ProcessingError, QueueResult};
use crate::queue::handlers::PredicateFn;
use crate::queue::options::{QueueOptions, StartOptions};
use crate::queue::predicate_queue::PredicateQueue;
use crate::queue::status::QueueStatus;
use std::sync::Arc;

/// A queue that applies its action to every item
///
/// Same lifecycle and notifications as [`PredicateQueue`], with a fixed
/// predicate that accepts everything. No item is ever reported as
/// rejected.
pub struct ActionQueue<T: Send + Sync + 'static> {
    inner: PredicateQueue<T>,
}

impl<T: Send + Sync + 'static> Default for ActionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> ActionQueue<T> {
    pub fn new() -> Self {
        Self::from_options(QueueOptions::default())
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self::from_options(QueueOptions::with_name(name))
    }

    pub fn from_options(options: QueueOptions) -> Self {
        let inner = PredicateQueue::from_options(options);
        let accept_all: PredicateFn<T> = Arc::new(|_| true);
        inner.install_handlers(Some(accept_all), None, None);
        Self { inner }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn status(&self) -> QueueStatus {
        self.inner.status()
    }

    pub fn is_cancellation_requested(&self) -> bool {
        self.inner.is_cancellation_requested()
    }

    pub fn items_in_queue(&self) -> usize {
        self.inner.items_in_queue()
    }

    pub fn error(&self) -> Option<ProcessingError> {
        self.inner.error()
    }

    pub fn clear_error(&self) {
        self.inner.clear_error();
    }

    pub fn set_action<F>(&self, action: Option<F>) -> QueueResult<()>
    where
        F: Fn(&T) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.inner.set_action(action)
    }

    pub fn set_callback<F>(&self, callback: Option<F>) -> QueueResult<()>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.inner.set_callback(callback)
    }

    pub fn stop_callbacks(&self) {
        self.inner.stop_callbacks();
    }

    pub fn enqueue(&self, item: T) -> QueueResult<()> {
        self.inner.enqueue(item)
    }

    pub fn enqueue_many<I>(&self, items: I) -> QueueResult<usize>
    where
        I: IntoIterator<Item = T>,
    {
        self.inner.enqueue_many(items)
    }

    pub fn start(&self) -> QueueResult<()> {
        self.inner.start()
    }

    pub fn start_with(&self, options: StartOptions) -> QueueResult<()> {
        self.inner.start_with(options)
    }

    pub fn stop(&self, process_remaining: bool) -> QueueResult<()> {
        self.inner.stop(process_remaining)
    }

    pub fn dispose(&self) -> QueueResult<()> {
        self.inner.dispose()
    }

    pub fn subscribe(
        &self,
        subscriber_id: impl Into<String>,
        filter: EventFilter,
        source: impl Into<String>,
        subscriber: Arc<dyn Subscriber<T>>,
    ) {
        self.inner.subscribe(subscriber_id, filter, source, subscriber);
    }

    pub fn subscribe_fn<F>(
        &self,
        subscriber_id: impl Into<String>,
        filter: EventFilter,
        source: impl Into<String>,
        handler: F,
    ) where
        F: Fn(&QueueEvent<T>) + Send + Sync + 'static,
    {
        self.inner.subscribe_fn(subscriber_id, filter, source, handler);
    }

    pub fn subscribe_channel(
        &self,
        subscriber_id: impl Into<String>,
        filter: EventFilter,
        source: impl Into<String>,
    ) -> EventReceiver<T> {
        self.inner.subscribe_channel(subscriber_id, filter, source)
    }

    pub fn unsubscribe(&self, subscriber_id: &str) -> bool {
        self.inner.unsubscribe(subscriber_id)
    }
}
