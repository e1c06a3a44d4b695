//! Traits for the notification system

use crate::notifications::error::SubscriberError;
use crate::notifications::event::QueueEvent;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Instant;

/// Delivery statistics tracked per subscriber
pub struct SubscriberStatistics {
    messages_processed: AtomicUsize,
    error_count: AtomicUsize,
    last_message_time: RwLock<Option<Instant>>,
    last_error_time: RwLock<Option<Instant>>,
}

impl Default for SubscriberStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SubscriberStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberStatistics")
            .field("messages_processed", &self.messages_processed())
            .field("error_count", &self.error_count())
            .finish()
    }
}

impl SubscriberStatistics {
    pub fn new() -> Self {
        Self {
            messages_processed: AtomicUsize::new(0),
            error_count: AtomicUsize::new(0),
            last_message_time: RwLock::new(None),
            last_error_time: RwLock::new(None),
        }
    }

    pub fn messages_processed(&self) -> usize {
        self.messages_processed.load(Ordering::Relaxed)
    }

    pub fn record_message_processed(&self) {
        self.messages_processed.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut time) = self.last_message_time.write() {
            *time = Some(Instant::now());
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    pub fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut time) = self.last_error_time.write() {
            *time = Some(Instant::now());
        }
    }

    pub fn last_message_time(&self) -> Option<Instant> {
        *self.last_message_time.read().ok()?
    }

    pub fn last_error_time(&self) -> Option<Instant> {
        *self.last_error_time.read().ok()?
    }
}

/// Receiver of queue events
///
/// Called synchronously on the publishing thread, which is usually the
/// queue's worker. Blocking here stalls the queue.
pub trait Subscriber<T>: Send + Sync {
    fn handle_event(&self, event: &QueueEvent<T>) -> Result<(), SubscriberError>;

    /// A closed subscriber is removed on the next publish
    fn is_closed(&self) -> bool {
        false
    }
}
