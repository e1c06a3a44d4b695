//! Worker coordination primitives
//!
//! - [`WakeSignal`]: the binary "items available" flag the worker waits on
//! - [`CancellationToken`]: cooperative stop request with the drain choice
//! - [`completion`]: one-shot finished signal the stopping thread waits for
//! - [`EmissionGate`]: serialises status writes with their broadcast

use crate::core::sync::recover_poison;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, ThreadId};

/// Binary "items available" signal
///
/// Producers raise it after pushing. The worker clears it only while the
/// store is confirmed idle under the signal's own lock, so a push that lands
/// between the idle check and the wait still wakes the worker.
#[derive(Debug, Default)]
pub struct WakeSignal {
    raised: Mutex<bool>,
    condvar: Condvar,
}

impl WakeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        let mut raised = recover_poison(self.raised.lock());
        *raised = true;
        self.condvar.notify_all();
    }

    pub fn is_raised(&self) -> bool {
        *recover_poison(self.raised.lock())
    }

    /// Reset the signal and block until it is raised again
    ///
    /// `idle` is evaluated under the signal lock. When it reports work (or a
    /// stop request) the call returns `false` immediately without waiting.
    pub fn wait_while_idle(&self, idle: impl Fn() -> bool) -> bool {
        let mut raised = recover_poison(self.raised.lock());
        if !idle() {
            return false;
        }

        *raised = false;
        while !*raised {
            raised = recover_poison(self.condvar.wait(raised));
        }
        true
    }
}

#[derive(Debug, Default)]
struct CancellationState {
    cancelled: AtomicBool,
    drain: AtomicBool,
}

/// Cooperative cancellation handed to the worker
///
/// Checked between drain passes, never while an item is in the pipeline.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<CancellationState>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation, recording whether queued items should be drained
    pub fn cancel(&self, drain: bool) {
        self.inner.drain.store(drain, Ordering::SeqCst);
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    pub fn should_drain(&self) -> bool {
        self.inner.drain.load(Ordering::SeqCst)
    }
}

/// Create a one-shot finished signal
pub fn completion() -> (CompletionSender, CompletionReceiver) {
    let (sender, receiver) = mpsc::sync_channel(1);
    (
        CompletionSender { sender },
        CompletionReceiver { receiver },
    )
}

/// Worker side of the finished signal
#[derive(Debug)]
pub struct CompletionSender {
    sender: mpsc::SyncSender<()>,
}

impl CompletionSender {
    pub fn complete(self) {
        // The receiver only goes away when nobody waits for the worker
        let _ = self.sender.send(());
    }
}

/// Stopping side of the finished signal
#[derive(Debug)]
pub struct CompletionReceiver {
    receiver: mpsc::Receiver<()>,
}

impl CompletionReceiver {
    /// Block until the worker finishes
    ///
    /// Fails when the sender was dropped without completing, which means the
    /// worker thread died before reaching the end of its loop.
    pub fn wait(self) -> Result<(), String> {
        self.receiver
            .recv()
            .map_err(|_| "worker exited without signalling completion".to_string())
    }
}

/// Re-entrant gate held while a status change is stored and broadcast
///
/// One thread at a time owns the gate, so subscribers see status events in
/// the order the statuses were stored. The owning thread may enter again,
/// which lets a subscriber call back into its queue.
#[derive(Debug, Default)]
pub struct EmissionGate {
    owner: Mutex<Option<(ThreadId, usize)>>,
    released: Condvar,
}

impl EmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until this thread owns the gate
    pub fn enter(&self) -> EmissionGuard<'_> {
        let me = thread::current().id();
        let mut owner = recover_poison(self.owner.lock());
        loop {
            match owner.as_mut() {
                None => {
                    *owner = Some((me, 1));
                    break;
                }
                Some((id, depth)) if *id == me => {
                    *depth += 1;
                    break;
                }
                Some(_) => owner = recover_poison(self.released.wait(owner)),
            }
        }
        EmissionGuard { gate: self }
    }

    fn leave(&self) {
        let mut owner = recover_poison(self.owner.lock());
        if let Some((_, depth)) = owner.as_mut() {
            *depth -= 1;
            if *depth == 0 {
                *owner = None;
                self.released.notify_all();
            }
        }
    }
}

/// Ownership of an [`EmissionGate`]; released on drop, including unwinds
#[derive(Debug)]
pub struct EmissionGuard<'a> {
    gate: &'a EmissionGate,
}

impl Drop for EmissionGuard<'_> {
    fn drop(&mut self) {
        self.gate.leave();
    }
}
