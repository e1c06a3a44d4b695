//! Thread-backed, predicate-filtered item processing queues
//!
//! See [`queue`] for the processing queues and [`notifications`] for the
//! events they publish.

pub mod app;
pub mod core;
pub mod notifications;
pub mod queue;
