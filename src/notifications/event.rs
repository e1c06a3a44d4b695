//! Event types for the notification system

use std::sync::Arc;
use std::time::SystemTime;

use crate::queue::error::{ErrorCause, ProcessingError};
use crate::queue::status::QueueStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum QueueEventType {
    StatusChanged,
    ActionCompleted,
    ErrorOccurred,
}

/// The queue's status changed
#[derive(Clone, Debug)]
pub struct StatusChangedEvent {
    pub timestamp: SystemTime,
    pub queue_name: Arc<str>,
    pub previous: QueueStatus,
    pub status: QueueStatus,
}

impl StatusChangedEvent {
    pub fn new(queue_name: Arc<str>, previous: QueueStatus, status: QueueStatus) -> Self {
        Self {
            timestamp: SystemTime::now(),
            queue_name,
            previous,
            status,
        }
    }
}

/// An item left the pipeline
///
/// `succeeded` is false for predicate rejections and action failures;
/// `message` is empty on success.
#[derive(Debug)]
pub struct ActionCompletedEvent<T> {
    pub timestamp: SystemTime,
    pub queue_name: Arc<str>,
    pub item: Arc<T>,
    pub succeeded: bool,
    pub message: String,
}

impl<T> ActionCompletedEvent<T> {
    pub fn success(queue_name: Arc<str>, item: Arc<T>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            queue_name,
            item,
            succeeded: true,
            message: String::new(),
        }
    }

    pub fn failure(queue_name: Arc<str>, item: Arc<T>, message: String) -> Self {
        Self {
            timestamp: SystemTime::now(),
            queue_name,
            item,
            succeeded: false,
            message,
        }
    }
}

// Derived Clone would require T: Clone
impl<T> Clone for ActionCompletedEvent<T> {
    fn clone(&self) -> Self {
        Self {
            timestamp: self.timestamp,
            queue_name: Arc::clone(&self.queue_name),
            item: Arc::clone(&self.item),
            succeeded: self.succeeded,
            message: self.message.clone(),
        }
    }
}

/// A processing or operational fault
///
/// `item` is absent for faults not tied to one item (dequeue, enqueue,
/// start and stop failures).
#[derive(Debug)]
pub struct ErrorOccurredEvent<T> {
    pub timestamp: SystemTime,
    pub queue_name: Arc<str>,
    pub item: Option<Arc<T>>,
    pub message: String,
    pub cause: Option<ErrorCause>,
}

impl<T> ErrorOccurredEvent<T> {
    pub fn new(
        queue_name: Arc<str>,
        item: Option<Arc<T>>,
        message: String,
        cause: Option<ErrorCause>,
    ) -> Self {
        Self {
            timestamp: SystemTime::now(),
            queue_name,
            item,
            message,
            cause,
        }
    }

    /// Build from a captured processing failure, keeping it as the cause
    pub fn from_processing(
        queue_name: Arc<str>,
        item: Option<Arc<T>>,
        error: &ProcessingError,
    ) -> Self {
        let cause: ErrorCause = Arc::new(error.clone());
        Self::new(queue_name, item, error.to_string(), Some(cause))
    }
}

impl<T> Clone for ErrorOccurredEvent<T> {
    fn clone(&self) -> Self {
        Self {
            timestamp: self.timestamp,
            queue_name: Arc::clone(&self.queue_name),
            item: self.item.clone(),
            message: self.message.clone(),
            cause: self.cause.clone(),
        }
    }
}

/// Events published by a processing queue
#[derive(Debug)]
pub enum QueueEvent<T> {
    StatusChanged(StatusChangedEvent),
    ActionCompleted(ActionCompletedEvent<T>),
    ErrorOccurred(ErrorOccurredEvent<T>),
}

impl<T> Clone for QueueEvent<T> {
    fn clone(&self) -> Self {
        match self {
            QueueEvent::StatusChanged(event) => QueueEvent::StatusChanged(event.clone()),
            QueueEvent::ActionCompleted(event) => QueueEvent::ActionCompleted(event.clone()),
            QueueEvent::ErrorOccurred(event) => QueueEvent::ErrorOccurred(event.clone()),
        }
    }
}

impl<T> QueueEvent<T> {
    pub fn event_type(&self) -> QueueEventType {
        match self {
            QueueEvent::StatusChanged(_) => QueueEventType::StatusChanged,
            QueueEvent::ActionCompleted(_) => QueueEventType::ActionCompleted,
            QueueEvent::ErrorOccurred(_) => QueueEventType::ErrorOccurred,
        }
    }

    pub fn queue_name(&self) -> &str {
        match self {
            QueueEvent::StatusChanged(event) => &event.queue_name,
            QueueEvent::ActionCompleted(event) => &event.queue_name,
            QueueEvent::ErrorOccurred(event) => &event.queue_name,
        }
    }

    pub fn timestamp(&self) -> SystemTime {
        match self {
            QueueEvent::StatusChanged(event) => event.timestamp,
            QueueEvent::ActionCompleted(event) => event.timestamp,
            QueueEvent::ErrorOccurred(event) => event.timestamp,
        }
    }
}

/// Event filter for subscribers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EventFilter {
    #[default]
    All,
    StatusOnly,
    ActionOnly,
    ErrorOnly,
}

impl EventFilter {
    pub fn accepts<T>(&self, event: &QueueEvent<T>) -> bool {
        match (self, event) {
            (EventFilter::All, _) => true,
            (EventFilter::StatusOnly, QueueEvent::StatusChanged(_)) => true,
            (EventFilter::ActionOnly, QueueEvent::ActionCompleted(_)) => true,
            (EventFilter::ErrorOnly, QueueEvent::ErrorOccurred(_)) => true,
            _ => false,
        }
    }
}
