//! User handler storage
//!
//! Handlers can be replaced from any thread while the worker runs. The
//! worker takes a [`Pipeline`] snapshot per item, so the next dequeued item
//! always sees the current handlers and no lock is held while user code runs.

use crate::core::sync::recover_poison;
use crate::queue::error::{ActionError, QueueError, QueueResult};
use std::sync::{Arc, RwLock};

pub type PredicateFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
pub type ActionFn<T> = Arc<dyn Fn(&T) -> Result<(), ActionError> + Send + Sync>;
pub type CallbackFn<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handlers in effect for one item
pub struct Pipeline<T> {
    pub predicate: PredicateFn<T>,
    pub action: ActionFn<T>,
    pub callback: Option<CallbackFn<T>>,
}

struct Handlers<T> {
    predicate: Option<PredicateFn<T>>,
    action: Option<ActionFn<T>>,
    callback: Option<CallbackFn<T>>,
}

pub struct HandlerSet<T> {
    handlers: RwLock<Handlers<T>>,
}

impl<T> Default for HandlerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandlerSet<T> {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Handlers {
                predicate: None,
                action: None,
                callback: None,
            }),
        }
    }

    pub fn set_predicate(&self, predicate: Option<PredicateFn<T>>) -> QueueResult<()> {
        let predicate = predicate.ok_or(QueueError::MissingHandler {
            handler: "Predicate",
        })?;
        self.replace_predicate(predicate);
        Ok(())
    }

    pub fn set_action(&self, action: Option<ActionFn<T>>) -> QueueResult<()> {
        let action = action.ok_or(QueueError::MissingHandler { handler: "Action" })?;
        self.replace_action(action);
        Ok(())
    }

    pub fn set_callback(&self, callback: Option<CallbackFn<T>>) -> QueueResult<()> {
        let callback = callback.ok_or(QueueError::MissingHandler {
            handler: "Callback",
        })?;
        self.replace_callback(callback);
        Ok(())
    }

    pub fn replace_predicate(&self, predicate: PredicateFn<T>) {
        recover_poison(self.handlers.write()).predicate = Some(predicate);
    }

    pub fn replace_action(&self, action: ActionFn<T>) {
        recover_poison(self.handlers.write()).action = Some(action);
    }

    pub fn replace_callback(&self, callback: CallbackFn<T>) {
        recover_poison(self.handlers.write()).callback = Some(callback);
    }

    pub fn clear_callback(&self) {
        recover_poison(self.handlers.write()).callback = None;
    }

    pub fn has_predicate(&self) -> bool {
        recover_poison(self.handlers.read()).predicate.is_some()
    }

    pub fn has_action(&self) -> bool {
        recover_poison(self.handlers.read()).action.is_some()
    }

    pub fn has_callback(&self) -> bool {
        recover_poison(self.handlers.read()).callback.is_some()
    }

    /// Snapshot of the current handlers; `None` until predicate and action are set
    pub fn pipeline(&self) -> Option<Pipeline<T>> {
        let handlers = recover_poison(self.handlers.read());
        Some(Pipeline {
            predicate: Arc::clone(handlers.predicate.as_ref()?),
            action: Arc::clone(handlers.action.as_ref()?),
            callback: handlers.callback.clone(),
        })
    }
}
