//! Public API for the notification system
//!
//! External modules should import from here rather than directly from
//! internal modules.

// Core event types and enums
pub use crate::notifications::event::{
    ActionCompletedEvent, ErrorOccurredEvent, EventFilter, QueueEvent, QueueEventType,
    StatusChangedEvent,
};

// Manager and utilities
pub use crate::notifications::error::{NotificationError, SubscriberError};
pub use crate::notifications::manager::{EventReceiver, NotificationManager};

// Traits and statistics
pub use crate::notifications::traits::{Subscriber, SubscriberStatistics};
