//! Test modules for the processing queue
//!
//! Tests are organized by functional area; shared fixtures live here.

mod concurrent;
mod errors;

use crate::notifications::api::{EventFilter, QueueEvent};
use crate::queue::api::{PredicateQueue, QueueStatus};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Poll `condition` until it holds or five seconds pass
pub(super) fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

/// Running total and call count shared with a summing action
#[derive(Clone, Default)]
pub(super) struct Tally {
    pub sum: Arc<AtomicI64>,
    pub calls: Arc<AtomicUsize>,
}

impl Tally {
    pub fn sum(&self) -> i64 {
        self.sum.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// A queue whose action adds every accepted item to a [`Tally`]
pub(super) fn summing_queue(
    predicate: impl Fn(&i64) -> bool + Send + Sync + 'static,
) -> (PredicateQueue<i64>, Tally) {
    let tally = Tally::default();
    let sink = tally.clone();
    let queue = PredicateQueue::builder()
        .name("summing")
        .predicate(predicate)
        .action(move |v: &i64| {
            sink.sum.fetch_add(*v, Ordering::SeqCst);
            sink.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .build();
    (queue, tally)
}

/// Record every status the queue announces
pub(super) fn record_statuses<T: Send + Sync + 'static>(
    queue: &PredicateQueue<T>,
) -> Arc<Mutex<Vec<QueueStatus>>> {
    let statuses = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&statuses);
    queue.subscribe_fn("status-log", EventFilter::StatusOnly, "test:status", move |event| {
        if let QueueEvent::StatusChanged(changed) = event {
            sink.lock().unwrap().push(changed.status);
        }
    });
    statuses
}

/// Wait for the worker to go idle
pub(super) fn wait_for_idle<T: Send + Sync + 'static>(queue: &PredicateQueue<T>) -> bool {
    wait_until(|| queue.status() == QueueStatus::Waiting && queue.items_in_queue() == 0)
}
