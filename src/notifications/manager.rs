//! NotificationManager implementation
//!
//! Each processing queue owns one manager. Publishing is synchronous: every
//! matching subscriber is invoked on the publishing thread, in registration
//! order, and one subscriber failing or panicking never stops the others.

use crate::core::error_handling::panic_text;
use crate::core::sync::recover_poison;
use crate::notifications::error::{NotificationError, SubscriberError};
use crate::notifications::event::{EventFilter, QueueEvent};
use crate::notifications::traits::{Subscriber, SubscriberStatistics};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, RwLock};

/// Receiving end of a channel subscription
pub type EventReceiver<T> = Receiver<QueueEvent<T>>;

struct SubscriberInfo<T> {
    subscriber_id: String,
    filter: EventFilter,
    source: String,
    subscriber: Arc<dyn Subscriber<T>>,
    statistics: Arc<SubscriberStatistics>,
}

/// Adapter for plain closures
struct FnSubscriber<F>(F);

impl<T, F> Subscriber<T> for FnSubscriber<F>
where
    F: Fn(&QueueEvent<T>) + Send + Sync,
{
    fn handle_event(&self, event: &QueueEvent<T>) -> Result<(), SubscriberError> {
        (self.0)(event);
        Ok(())
    }
}

/// Forwards events into an mpsc channel
struct ChannelSubscriber<T> {
    subscriber_id: String,
    sender: Sender<QueueEvent<T>>,
    closed: AtomicBool,
}

impl<T: Send + Sync> Subscriber<T> for ChannelSubscriber<T> {
    fn handle_event(&self, event: &QueueEvent<T>) -> Result<(), SubscriberError> {
        if self.sender.send(event.clone()).is_err() {
            self.closed.store(true, Ordering::Relaxed);
            return Err(Box::new(NotificationError::ChannelClosed(
                self.subscriber_id.clone(),
            )));
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

pub struct NotificationManager<T> {
    subscribers: RwLock<Vec<Arc<SubscriberInfo<T>>>>,
}

impl<T: Send + Sync + 'static> Default for NotificationManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> NotificationManager<T> {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Register a subscriber under `subscriber_id`
    ///
    /// An existing subscription with the same id is replaced in place and
    /// keeps its position in the delivery order.
    pub fn subscribe(
        &self,
        subscriber_id: impl Into<String>,
        filter: EventFilter,
        source: impl Into<String>,
        subscriber: Arc<dyn Subscriber<T>>,
    ) {
        let info = Arc::new(SubscriberInfo {
            subscriber_id: subscriber_id.into(),
            filter,
            source: source.into(),
            subscriber,
            statistics: Arc::new(SubscriberStatistics::new()),
        });

        let mut subscribers = recover_poison(self.subscribers.write());
        match subscribers
            .iter_mut()
            .find(|existing| existing.subscriber_id == info.subscriber_id)
        {
            Some(existing) => {
                log::warn!(
                    "Subscriber '{}' replaced existing subscription (source: {} -> {})",
                    info.subscriber_id,
                    existing.source,
                    info.source
                );
                *existing = info;
            }
            None => {
                log::trace!(
                    "Subscriber '{}' registered (source: {})",
                    info.subscriber_id,
                    info.source
                );
                subscribers.push(info);
            }
        }
    }

    /// Register a closure as a subscriber
    pub fn subscribe_fn<F>(
        &self,
        subscriber_id: impl Into<String>,
        filter: EventFilter,
        source: impl Into<String>,
        handler: F,
    ) where
        F: Fn(&QueueEvent<T>) + Send + Sync + 'static,
    {
        self.subscribe(subscriber_id, filter, source, Arc::new(FnSubscriber(handler)));
    }

    /// Register a channel subscription and return its receiver
    ///
    /// Dropping the receiver unsubscribes on the next publish.
    pub fn subscribe_channel(
        &self,
        subscriber_id: impl Into<String>,
        filter: EventFilter,
        source: impl Into<String>,
    ) -> EventReceiver<T> {
        let subscriber_id = subscriber_id.into();
        let (sender, receiver) = channel();
        let subscriber = ChannelSubscriber {
            subscriber_id: subscriber_id.clone(),
            sender,
            closed: AtomicBool::new(false),
        };
        self.subscribe(subscriber_id, filter, source, Arc::new(subscriber));
        receiver
    }

    pub fn unsubscribe(&self, subscriber_id: &str) -> bool {
        let mut subscribers = recover_poison(self.subscribers.write());
        let before = subscribers.len();
        subscribers.retain(|info| info.subscriber_id != subscriber_id);
        subscribers.len() != before
    }

    pub fn clear_subscribers(&self) {
        recover_poison(self.subscribers.write()).clear();
    }

    pub fn subscriber_count(&self) -> usize {
        recover_poison(self.subscribers.read()).len()
    }

    pub fn has_subscriber(&self, subscriber_id: &str) -> bool {
        recover_poison(self.subscribers.read())
            .iter()
            .any(|info| info.subscriber_id == subscriber_id)
    }

    pub fn subscriber_statistics(&self, subscriber_id: &str) -> Option<Arc<SubscriberStatistics>> {
        recover_poison(self.subscribers.read())
            .iter()
            .find(|info| info.subscriber_id == subscriber_id)
            .map(|info| Arc::clone(&info.statistics))
    }

    /// Deliver an event to every subscriber whose filter accepts it
    ///
    /// Subscribers are snapshotted first, so a handler may subscribe,
    /// unsubscribe or call back into the queue without deadlocking.
    pub fn publish(&self, event: QueueEvent<T>) -> Result<(), NotificationError> {
        let snapshot: Vec<Arc<SubscriberInfo<T>>> =
            recover_poison(self.subscribers.read()).clone();
        if snapshot.is_empty() {
            return Ok(());
        }

        let mut failed_subscribers = Vec::new();
        let mut closed = Vec::new();

        for info in snapshot.iter().filter(|info| info.filter.accepts(&event)) {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                info.subscriber.handle_event(&event)
            }));

            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(payload) => Some(format!("panicked: {}", panic_text(payload.as_ref()))),
            };

            match failure {
                None => info.statistics.record_message_processed(),
                Some(message) => {
                    info.statistics.record_error();
                    if info.subscriber.is_closed() {
                        log::debug!(
                            "Subscriber '{}' closed, removing (source: {})",
                            info.subscriber_id,
                            info.source
                        );
                        closed.push(Arc::clone(info));
                    } else {
                        let error = NotificationError::SubscriberFailed {
                            subscriber_id: info.subscriber_id.clone(),
                            message,
                        };
                        log::warn!("{} (source: {})", error, info.source);
                    }
                    failed_subscribers.push(info.subscriber_id.clone());
                }
            }
        }

        if !closed.is_empty() {
            // Compare by identity so a replacement registered meanwhile survives
            recover_poison(self.subscribers.write())
                .retain(|info| !closed.iter().any(|gone| Arc::ptr_eq(gone, info)));
        }

        if !failed_subscribers.is_empty() {
            return Err(NotificationError::PublishFailed {
                event_type: event.event_type().to_string(),
                failed_subscribers,
            });
        }

        Ok(())
    }
}
