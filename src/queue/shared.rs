//! State shared between a queue handle and its worker thread

use crate::notifications::api::{
    ActionCompletedEvent, ErrorOccurredEvent, NotificationManager, QueueEvent,
    StatusChangedEvent,
};
use crate::queue::error::{ErrorCause, PipelineStage, ProcessingError};
use crate::queue::handlers::HandlerSet;
use crate::queue::signal::{EmissionGate, EmissionGuard, WakeSignal};
use crate::queue::status::{QueueStatus, StatusCell, StatusChange};
use crate::queue::store::ItemStore;
use std::sync::Arc;

pub(crate) struct SharedQueue<T> {
    pub name: Arc<str>,
    pub store: ItemStore<T>,
    pub wake: WakeSignal,
    pub state: StatusCell,
    emission: EmissionGate,
    pub handlers: HandlerSet<T>,
    pub notifications: NotificationManager<T>,
}

impl<T: Send + Sync + 'static> SharedQueue<T> {
    pub fn new(name: Arc<str>) -> Self {
        Self {
            name,
            store: ItemStore::new(),
            wake: WakeSignal::new(),
            state: StatusCell::new(),
            emission: EmissionGate::new(),
            handlers: HandlerSet::new(),
            notifications: NotificationManager::new(),
        }
    }

    /// Control-plane status write
    pub fn transition(&self, next: QueueStatus) {
        self.change_status(|state| state.set(next));
    }

    /// Worker status write, dropped while a stop is in progress
    pub fn worker_transition(&self, next: QueueStatus) {
        self.change_status(|state| state.set_from_worker(next));
    }

    /// Hold the emission gate across several status writes
    pub fn hold_emission(&self) -> EmissionGuard<'_> {
        self.emission.enter()
    }

    /// Store a status change and broadcast it as one ordered step
    ///
    /// No other thread can store or announce a status until every subscriber
    /// has seen this one.
    pub fn change_status(&self, write: impl FnOnce(&StatusCell) -> Option<StatusChange>) {
        let _emitting = self.emission.enter();
        let Some(change) = write(&self.state) else {
            return;
        };
        log::trace!(
            "Queue '{}' status {} -> {}",
            self.name,
            change.previous,
            change.current
        );
        self.publish(QueueEvent::StatusChanged(StatusChangedEvent::new(
            Arc::clone(&self.name),
            change.previous,
            change.current,
        )));
    }

    pub fn completed(&self, item: &Arc<T>, succeeded: bool, message: &str) {
        let event = if succeeded {
            ActionCompletedEvent::success(Arc::clone(&self.name), Arc::clone(item))
        } else {
            ActionCompletedEvent::failure(
                Arc::clone(&self.name),
                Arc::clone(item),
                message.to_string(),
            )
        };
        self.publish(QueueEvent::ActionCompleted(event));
    }

    /// Broadcast an operational fault; status is left alone
    pub fn report_error(&self, item: Option<Arc<T>>, message: String, cause: Option<ErrorCause>) {
        log::error!("Queue '{}': {}", self.name, message);
        self.publish(QueueEvent::ErrorOccurred(ErrorOccurredEvent::new(
            Arc::clone(&self.name),
            item,
            message,
            cause,
        )));
    }

    /// Broadcast a processing failure, then record it as the queue's error
    pub fn record_failure(&self, item: Option<&Arc<T>>, error: ProcessingError) {
        log::warn!("Queue '{}' failed to process an item: {}", self.name, error);
        self.publish(QueueEvent::ErrorOccurred(ErrorOccurredEvent::from_processing(
            Arc::clone(&self.name),
            item.cloned(),
            &error,
        )));
        if let Some(item) = item {
            if error.stage() != Some(PipelineStage::Callback) {
                self.completed(item, false, &error.to_string());
            }
        }
        self.change_status(|state| state.record_error(error));
    }

    fn publish(&self, event: QueueEvent<T>) {
        if let Err(e) = self.notifications.publish(event) {
            log::debug!("Queue '{}': {}", self.name, e);
        }
    }
}
