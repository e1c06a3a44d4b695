//! Queue status state machine
//!
//! The status, the cancellation flag and the last processing error live
//! behind one lock so no observer can see a cancellation without the
//! matching `Cancelling` status. Every mutating method returns the status
//! change it made, which the caller then broadcasts.

use crate::core::sync::recover_poison;
use crate::queue::error::ProcessingError;
use std::sync::Mutex;

/// Lifecycle status of a processing queue
///
/// ```text
/// Initialized ─► Starting ─► Processing ⇄ Waiting ─► Stopping ─► Cancelling ─► Stopped
///                   ▲              │                                            │
///                   │              └──► Error (until the next wake)            │
///                   └──────────────────────────────────────────────────────────┘
/// any ─► Disposing ─► Disposed
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
pub enum QueueStatus {
    /// Created and configurable, never started
    Initialized,
    /// Stopped; may be restarted
    Stopped,
    /// Start accepted, worker thread spawning
    Starting,
    /// Worker is draining items
    Processing,
    /// Worker is blocked waiting for items
    Waiting,
    /// Cancellation requested; the worker is finishing its last pass
    Cancelling,
    /// Stop accepted
    Stopping,
    /// The last item failed; see the queue's error
    Error,
    Disposing,
    Disposed,
}

impl QueueStatus {
    /// Whether enqueue calls are accepted in this status
    pub fn accepts_items(self) -> bool {
        matches!(
            self,
            QueueStatus::Initialized
                | QueueStatus::Starting
                | QueueStatus::Processing
                | QueueStatus::Waiting
        )
    }

    /// Whether start is valid from this status
    pub fn can_start(self) -> bool {
        matches!(self, QueueStatus::Initialized | QueueStatus::Stopped)
    }

    /// Whether a stop request is a no-op in this status
    pub fn is_stop_noop(self) -> bool {
        matches!(
            self,
            QueueStatus::Initialized
                | QueueStatus::Stopping
                | QueueStatus::Stopped
                | QueueStatus::Disposing
                | QueueStatus::Disposed
        )
    }

    /// Whether the worker may overwrite this status with its own progress
    fn yields_to_worker(self) -> bool {
        !matches!(
            self,
            QueueStatus::Stopping
                | QueueStatus::Cancelling
                | QueueStatus::Stopped
                | QueueStatus::Disposing
                | QueueStatus::Disposed
        )
    }
}

/// A status write that changed the current value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub previous: QueueStatus,
    pub current: QueueStatus,
}

/// Snapshot of the guarded queue state
#[derive(Debug, Clone)]
pub struct QueueState {
    pub status: QueueStatus,
    pub cancellation_requested: bool,
    pub error: Option<ProcessingError>,
}

pub(crate) struct StatusCell {
    state: Mutex<QueueState>,
}

impl StatusCell {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                status: QueueStatus::Initialized,
                cancellation_requested: false,
                error: None,
            }),
        }
    }

    pub fn snapshot(&self) -> QueueState {
        recover_poison(self.state.lock()).clone()
    }

    pub fn status(&self) -> QueueStatus {
        recover_poison(self.state.lock()).status
    }

    pub fn cancellation_requested(&self) -> bool {
        recover_poison(self.state.lock()).cancellation_requested
    }

    pub fn error(&self) -> Option<ProcessingError> {
        recover_poison(self.state.lock()).error.clone()
    }

    pub fn clear_error(&self) {
        recover_poison(self.state.lock()).error = None;
    }

    /// Control-plane write; always applied
    pub fn set(&self, next: QueueStatus) -> Option<StatusChange> {
        let mut state = recover_poison(self.state.lock());
        Self::apply(&mut state, next)
    }

    /// Worker write; ignored while a stop or dispose is in progress
    pub fn set_from_worker(&self, next: QueueStatus) -> Option<StatusChange> {
        let mut state = recover_poison(self.state.lock());
        if state.cancellation_requested || !state.status.yields_to_worker() {
            return None;
        }
        Self::apply(&mut state, next)
    }

    /// Raise the cancellation flag together with the `Cancelling` status
    ///
    /// `on_cancel` runs under the same lock, so the worker's token flips in
    /// the same critical section as the observable state.
    pub fn request_cancellation(&self, on_cancel: impl FnOnce()) -> Option<StatusChange> {
        let mut state = recover_poison(self.state.lock());
        state.cancellation_requested = true;
        on_cancel();
        Self::apply(&mut state, QueueStatus::Cancelling)
    }

    /// Lower the cancellation flag and settle on the final status
    pub fn complete_cancellation(&self, final_status: QueueStatus) -> Option<StatusChange> {
        let mut state = recover_poison(self.state.lock());
        state.cancellation_requested = false;
        Self::apply(&mut state, final_status)
    }

    /// Record a processing failure and move to `Error` unless stopping
    pub fn record_error(&self, error: ProcessingError) -> Option<StatusChange> {
        let mut state = recover_poison(self.state.lock());
        state.error = Some(error);
        if state.cancellation_requested || !state.status.yields_to_worker() {
            return None;
        }
        Self::apply(&mut state, QueueStatus::Error)
    }

    fn apply(state: &mut QueueState, next: QueueStatus) -> Option<StatusChange> {
        let previous = state.status;
        if previous == next {
            return None;
        }
        state.status = next;
        Some(StatusChange {
            previous,
            current: next,
        })
    }
}
