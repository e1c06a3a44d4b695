//! Thread-backed Processing Queue Component
//!
//! A generic item-processing queue: callers enqueue items from any thread and
//! a single dedicated worker thread drains them in order through a
//! predicate, an action and an optional callback.
//!
//! # Overview
//!
//! - **Any number of producers**: `enqueue` never blocks and is safe from any thread
//! - **One worker per queue**: items are processed strictly one at a time
//! - **Explicit lifecycle**: start, stop (drain or discard), restart, dispose
//! - **Observable state**: status changes, per-item completions and errors are
//!   published through the notification system
//! - **Failure isolation**: a failing or panicking handler marks the queue
//!   `Error` and aborts the current pass; the worker keeps running
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  ┌────────────┐  ┌────────────┐
//! │ Producer A │  │ Producer B │  │ Producer C │
//! └─────┬──────┘  └─────┬──────┘  └─────┬──────┘
//!       │ enqueue       │ enqueue       │ enqueue
//!       ▼               ▼               ▼
//! ┌──────────────────────────────────────────────┐
//! │ ItemStore (FIFO) ─── raise ──► WakeSignal    │
//! └──────────────────────┬───────────────────────┘
//!                        │ drain pass
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │ Worker thread                                │
//! │   predicate ─► action ─► callback            │
//! │   status: Processing ⇄ Waiting, Error        │
//! └──────────────────────┬───────────────────────┘
//!                        │ StatusChanged / ActionCompleted / ErrorOccurred
//!                        ▼
//!                NotificationManager
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use itemqueue::notifications::api::{EventFilter, QueueEvent};
//! use itemqueue::queue::api::{PredicateQueue, QueueStatus};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let queue = PredicateQueue::<u32>::builder()
//!     .name("squares")
//!     .predicate(|n| *n < 100)
//!     .action(|n| {
//!         println!("{}² = {}", n, n * n);
//!         Ok(())
//!     })
//!     .build();
//!
//! let events = queue.subscribe_channel("audit", EventFilter::ActionOnly, "example");
//!
//! queue.start()?;
//! queue.enqueue_many([3, 4, 500])?;
//! queue.stop(true)?;
//! assert_eq!(queue.status(), QueueStatus::Stopped);
//!
//! let rejected = events
//!     .try_iter()
//!     .filter(|event| matches!(event, QueueEvent::ActionCompleted(e) if !e.succeeded))
//!     .count();
//! assert_eq!(rejected, 1);
//! # Ok(())
//! # }
//! ```

pub mod api;

pub(crate) mod action_queue;
pub(crate) mod builder;
pub(crate) mod error;
pub(crate) mod function_queue;
pub(crate) mod handlers;
pub(crate) mod options;
pub(crate) mod predicate_queue;
pub(crate) mod shared;
pub(crate) mod signal;
pub(crate) mod status;
pub(crate) mod store;
pub(crate) mod worker;

#[cfg(test)]
mod tests;
