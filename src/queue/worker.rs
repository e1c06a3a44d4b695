//! Processing worker
//!
//! One thread per running queue. The loop alternates between draining the
//! items visible at the start of a pass and waiting on the wake signal.
//! Cancellation is only checked between passes; an item that entered the
//! pipeline always finishes it.

use crate::queue::error::{PipelineStage, ProcessingError};
use crate::queue::handlers::Pipeline;
use crate::queue::shared::SharedQueue;
use crate::queue::signal::{CancellationToken, CompletionSender};
use crate::queue::status::QueueStatus;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

pub(crate) const PREDICATE_REJECTED: &str = "The predicate returned false for the item";

/// How a drain pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassOutcome {
    /// Every item visible at the start of the pass went through the pipeline
    Completed,
    /// A failure stopped the pass; later items remain queued
    Aborted,
}

pub(crate) fn run<T: Send + Sync + 'static>(
    shared: Arc<SharedQueue<T>>,
    token: CancellationToken,
    finished: CompletionSender,
) {
    log::debug!("Queue '{}' worker started", shared.name);
    shared.worker_transition(QueueStatus::Processing);

    while !token.is_cancelled() {
        if shared.store.is_empty() {
            shared.worker_transition(QueueStatus::Waiting);
            shared
                .wake
                .wait_while_idle(|| shared.store.is_empty() && !token.is_cancelled());
        } else {
            shared.worker_transition(QueueStatus::Processing);
            drain_pass(&shared);
        }
    }

    if token.should_drain() {
        let mut passes = 0;
        let mut aborted = 0;
        while !shared.store.is_empty() {
            passes += 1;
            if drain_pass(&shared) == PassOutcome::Aborted {
                aborted += 1;
            }
        }
        log::debug!(
            "Queue '{}' drained remaining items in {} pass(es), {} aborted",
            shared.name,
            passes,
            aborted
        );
    } else {
        match shared.store.discard_all() {
            Ok(0) => {}
            Ok(discarded) => log::debug!(
                "Queue '{}' discarded {} unprocessed item(s)",
                shared.name,
                discarded
            ),
            Err(message) => shared.report_error(None, message, None),
        }
    }

    log::debug!("Queue '{}' worker finished", shared.name);
    finished.complete();
}

fn drain_pass<T: Send + Sync + 'static>(shared: &SharedQueue<T>) -> PassOutcome {
    for slot in shared.store.drain_all() {
        let item = match slot {
            Ok(item) => Arc::new(item),
            Err(message) => {
                shared.record_failure(None, ProcessingError::Dequeue { message });
                return PassOutcome::Aborted;
            }
        };

        // Handlers cannot be unset once start has checked them
        let Some(pipeline) = shared.handlers.pipeline() else {
            shared.record_failure(
                Some(&item),
                ProcessingError::Dequeue {
                    message: "no predicate or action is set".to_string(),
                },
            );
            return PassOutcome::Aborted;
        };

        if let Err(error) = process_item(shared, &pipeline, &item) {
            shared.record_failure(Some(&item), error);
            return PassOutcome::Aborted;
        }
    }
    PassOutcome::Completed
}

fn process_item<T: Send + Sync + 'static>(
    shared: &SharedQueue<T>,
    pipeline: &Pipeline<T>,
    item: &Arc<T>,
) -> Result<(), ProcessingError> {
    let accepted = guarded(PipelineStage::Predicate, || (pipeline.predicate)(item))?;
    if !accepted {
        shared.completed(item, false, PREDICATE_REJECTED);
        return Ok(());
    }

    guarded(PipelineStage::Action, || (pipeline.action)(item))?
        .map_err(ProcessingError::from_action)?;
    shared.completed(item, true, "");

    if let Some(callback) = &pipeline.callback {
        guarded(PipelineStage::Callback, || callback(item))?;
    }
    Ok(())
}

/// Run user code, turning a panic into a processing error
fn guarded<R>(stage: PipelineStage, f: impl FnOnce() -> R) -> Result<R, ProcessingError> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .map_err(|payload| ProcessingError::from_panic(stage, payload))
}
