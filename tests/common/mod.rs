//! Common test utilities and helpers
//!
//! Shared subscribers and polling helpers for the integration tests.

#![allow(dead_code)]

use itemqueue::notifications::api::{QueueEvent, Subscriber, SubscriberError};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

/// Poll `condition` until it holds or five seconds pass
pub fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

/// Subscriber that keeps a copy of every event it receives
pub struct EventLog<T> {
    events: Mutex<Vec<QueueEvent<T>>>,
}

impl<T> Default for EventLog<T> {
    fn default() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }
}

impl<T> EventLog<T> {
    pub fn events(&self) -> Vec<QueueEvent<T>> {
        self.events.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl<T: Send + Sync> Subscriber<T> for EventLog<T> {
    fn handle_event(&self, event: &QueueEvent<T>) -> Result<(), SubscriberError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Subscriber that rejects every event
pub struct FailingSubscriber;

impl<T> Subscriber<T> for FailingSubscriber {
    fn handle_event(&self, _event: &QueueEvent<T>) -> Result<(), SubscriberError> {
        Err("subscriber refused the event".into())
    }
}
