//! Processing queue that maps items to results

use crate::core::sync::recover_poison;
use crate::notifications::api::{EventFilter, EventReceiver, QueueEvent, Subscriber};
use crate::queue::error::{ActionError, ProcessingError, QueueError, QueueResult};
use crate::queue::handlers::{ActionFn, PredicateFn};
use crate::queue::options::{QueueOptions, StartOptions};
use crate::queue::predicate_queue::PredicateQueue;
use crate::queue::status::QueueStatus;
use std::sync::{Arc, RwLock};

pub type FunctionFn<T, R> = Arc<dyn Fn(&T) -> Result<R, ActionError> + Send + Sync>;
pub type ResultCallbackFn<T, R> = Arc<dyn Fn(&T, R) + Send + Sync>;

struct FunctionHandlers<T, R> {
    function: RwLock<Option<FunctionFn<T, R>>>,
    result_callback: RwLock<Option<ResultCallbackFn<T, R>>>,
}

/// A queue that applies a function to every item and hands each result on
///
/// The function runs as the queue's action: an `Err` is a processing
/// failure like any failed action. The result callback receives the item
/// with its result before the item is reported as completed.
///
/// # Examples
/// ```
/// use itemqueue::queue::api::FunctionQueue;
/// use std::sync::{Arc, Mutex};
///
/// let lengths = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&lengths);
///
/// let queue: FunctionQueue<String, usize> = FunctionQueue::with_name("lengths");
/// queue.set_function(Some(|s: &String| Ok(s.len()))).unwrap();
/// queue
///     .set_result_callback(Some(move |_: &String, len: usize| sink.lock().unwrap().push(len)))
///     .unwrap();
///
/// queue.start().unwrap();
/// queue.enqueue_many(["a".to_string(), "abc".to_string()]).unwrap();
/// queue.stop(true).unwrap();
///
/// assert_eq!(*lengths.lock().unwrap(), vec![1, 3]);
/// ```
pub struct FunctionQueue<T: Send + Sync + 'static, R: 'static> {
    inner: PredicateQueue<T>,
    handlers: Arc<FunctionHandlers<T, R>>,
}

impl<T: Send + Sync + 'static, R: 'static> Default for FunctionQueue<T, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static, R: 'static> FunctionQueue<T, R> {
    pub fn new() -> Self {
        Self::from_options(QueueOptions::default())
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self::from_options(QueueOptions::with_name(name))
    }

    pub fn from_options(options: QueueOptions) -> Self {
        let handlers = Arc::new(FunctionHandlers {
            function: RwLock::new(None),
            result_callback: RwLock::new(None),
        });

        let accept_all: PredicateFn<T> = Arc::new(|_| true);
        let action_handlers = Arc::clone(&handlers);
        let action: ActionFn<T> = Arc::new(move |item: &T| -> Result<(), ActionError> {
            let function = recover_poison(action_handlers.function.read())
                .clone()
                .ok_or(QueueError::NoFunction)?;
            let result = function(item)?;
            let callback = recover_poison(action_handlers.result_callback.read()).clone();
            if let Some(callback) = callback {
                callback(item, result);
            }
            Ok(())
        });

        let inner = PredicateQueue::from_options(options);
        inner.install_handlers(Some(accept_all), Some(action), None);
        Self { inner, handlers }
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

    /// Replace the function; `None` is rejected
    pub fn set_function<F>(&self, function: Option<F>) -> QueueResult<()>
    where
        F: Fn(&T) -> Result<R, ActionError> + Send + Sync + 'static,
    {
        let function = function.ok_or(QueueError::MissingHandler {
            handler: "Function",
        })?;
        let function: FunctionFn<T, R> = Arc::new(function);
        *recover_poison(self.handlers.function.write()) = Some(function);
        Ok(())
    }

    /// Replace the callback that receives each result; `None` is rejected
    pub fn set_result_callback<F>(&self, callback: Option<F>) -> QueueResult<()>
    where
        F: Fn(&T, R) + Send + Sync + 'static,
    {
        let callback = callback.ok_or(QueueError::MissingHandler {
            handler: "Callback",
        })?;
        let callback: ResultCallbackFn<T, R> = Arc::new(callback);
        *recover_poison(self.handlers.result_callback.write()) = Some(callback);
        Ok(())
    }

    /// Stop passing results on; the function keeps running
    pub fn stop_callbacks(&self) {
        *recover_poison(self.handlers.result_callback.write()) = None;
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
        self.check_function()?;
        self.inner.start()
    }

    pub fn start_with(&self, options: StartOptions) -> QueueResult<()> {
        self.check_function()?;
        self.inner.start_with(options)
    }

    fn check_function(&self) -> QueueResult<()> {
        if recover_poison(self.handlers.function.read()).is_none() {
            return Err(QueueError::NoFunction);
        }
        Ok(())
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
