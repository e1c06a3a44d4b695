//! Error types for the notification system

/// Error a subscriber returns from `handle_event`
pub type SubscriberError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum NotificationError {
    #[error("Channel closed for subscriber: {0}")]
    ChannelClosed(String),

    #[error("Subscriber '{subscriber_id}' failed: {message}")]
    SubscriberFailed {
        subscriber_id: String,
        message: String,
    },

    #[error("Failed to publish {event_type} event to {} subscribers: {failed_subscribers:?}", .failed_subscribers.len())]
    PublishFailed {
        event_type: String,
        failed_subscribers: Vec<String>,
    },
}

impl crate::core::error_handling::ContextualError for NotificationError {
    fn is_user_actionable(&self) -> bool {
        false // All notification errors are system-level
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error_handling::ContextualError;

    #[test]
    fn test_publish_failed_display() {
        let error = NotificationError::PublishFailed {
            event_type: "StatusChanged".to_string(),
            failed_subscribers: vec!["audit".to_string(), "metrics".to_string()],
        };

        let text = error.to_string();
        assert!(text.starts_with("Failed to publish StatusChanged event to 2 subscribers"));
        assert!(text.contains("audit"));
        assert!(!error.is_user_actionable());
    }
}
