//! Synchronisation helpers for lock poisoning
//!
//! Queue state is shared between producer threads, the control plane and the
//! worker thread. A user handler that panics while the worker holds a lock
//! poisons it; these helpers turn that into a typed error instead of a
//! second panic on the next caller.

use std::sync::{LockResult, MutexGuard};

/// Map a poisoned mutex lock into an application error
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use itemqueue::core::sync::handle_mutex_poison;
/// use itemqueue::queue::api::QueueError;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(
///     mutex.lock(),
///     |message| QueueError::Store { message }
/// ).unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<'a, T, E>(
    result: LockResult<MutexGuard<'a, T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<MutexGuard<'a, T>, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (mutex poisoned). A panic occurred while holding the lock: {}",
            poison_err
        ))
    })
}

/// Take the guard even when poisoned
///
/// Used for state whose invariants cannot be broken by a panicking holder,
/// such as a plain status value that is always written in one assignment.
pub fn recover_poison<G>(result: LockResult<G>) -> G {
    result.unwrap_or_else(|poison_err| {
        log::warn!("Recovering from poisoned lock");
        poison_err.into_inner()
    })
}
