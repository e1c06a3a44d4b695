//! Tests for processing failures and their notifications

#[cfg(test)]
mod tests {
    use crate::notifications::api::{EventFilter, QueueEvent};
    use crate::queue::api::{
        ActionError, PipelineStage, PredicateQueue, ProcessingError, QueueStatus,
    };
    use crate::queue::tests::{record_statuses, wait_for_idle, wait_until};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Queue whose action fails for `bad` and records every other item
    fn failing_on(bad: i64) -> (PredicateQueue<i64>, Arc<Mutex<Vec<i64>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let queue = PredicateQueue::builder()
            .name("failing")
            .predicate(|_: &i64| true)
            .action(move |v: &i64| -> Result<(), ActionError> {
                if *v == bad {
                    return Err(format!("cannot handle {}", v).into());
                }
                sink.lock().unwrap().push(*v);
                Ok(())
            })
            .build();
        (queue, seen)
    }

    #[test]
    fn test_action_failure_is_broadcast_and_recorded() {
        let (queue, _) = failing_on(3);
        let events = queue.subscribe_channel("audit", EventFilter::All, "test");
        let statuses = record_statuses(&queue);

        queue.enqueue(3).unwrap();
        queue.start().unwrap();
        assert!(wait_until(|| queue.error().is_some()));
        queue.stop(true).unwrap();

        let error = queue.error().unwrap();
        assert!(matches!(error, ProcessingError::Action { .. }));
        assert_eq!(error.stage(), Some(PipelineStage::Action));
        assert_eq!(error.to_string(), "Action failed: cannot handle 3");
        assert!(statuses.lock().unwrap().contains(&QueueStatus::Error));

        let events: Vec<_> = events.try_iter().collect();
        let error_event = events
            .iter()
            .find_map(|event| match event {
                QueueEvent::ErrorOccurred(e) => Some(e),
                _ => None,
            })
            .unwrap();
        assert_eq!(error_event.item.as_deref(), Some(&3));
        assert!(error_event.cause.is_some());

        let completion = events
            .iter()
            .find_map(|event| match event {
                QueueEvent::ActionCompleted(e) => Some(e),
                _ => None,
            })
            .unwrap();
        assert!(!completion.succeeded);
        assert!(completion.message.contains("cannot handle 3"));

        // The error event comes first
        let error_index = events
            .iter()
            .position(|e| matches!(e, QueueEvent::ErrorOccurred(_)))
            .unwrap();
        let completed_index = events
            .iter()
            .position(|e| matches!(e, QueueEvent::ActionCompleted(_)))
            .unwrap();
        assert!(error_index < completed_index);
    }

    #[test]
    fn test_worker_continues_after_failure() {
        let (queue, seen) = failing_on(3);
        queue.enqueue_many(1..=6).unwrap();
        queue.start().unwrap();
        assert!(wait_for_idle(&queue));

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 4, 5, 6]);
        // Status moved on; the recorded error is still there
        assert_eq!(queue.status(), QueueStatus::Waiting);
        assert!(queue.error().is_some());

        queue.clear_error();
        assert!(queue.error().is_none());
        queue.stop(true).unwrap();
    }

    #[test]
    fn test_restart_clears_error() {
        let (queue, _) = failing_on(1);
        queue.enqueue(1).unwrap();
        queue.start().unwrap();
        queue.stop(true).unwrap();
        assert!(queue.error().is_some());
        assert!(queue.state().error.is_some());

        queue.start().unwrap();
        assert!(queue.error().is_none());
        queue.stop(true).unwrap();
    }

    #[test]
    fn test_action_panic_is_captured() {
        let queue = PredicateQueue::builder()
            .predicate(|_: &i64| true)
            .action(|v: &i64| {
                if *v < 0 {
                    panic!("negative item {}", v);
                }
                Ok(())
            })
            .build();

        queue.enqueue_many(vec![-1, 2]).unwrap();
        queue.start().unwrap();
        assert!(wait_for_idle(&queue));

        match queue.error() {
            Some(ProcessingError::Panicked { stage, message }) => {
                assert_eq!(stage, PipelineStage::Action);
                assert_eq!(message, "negative item -1");
            }
            other => panic!("expected a captured panic, got {:?}", other),
        }
        queue.stop(true).unwrap();
    }

    #[test]
    fn test_predicate_panic_is_captured() {
        let calls = Arc::new(AtomicUsize::new(0));
        let queue = {
            let calls = Arc::clone(&calls);
            PredicateQueue::builder()
                .predicate(|v: &i64| {
                    assert!(*v != 0, "zero is not allowed");
                    true
                })
                .action(move |_: &i64| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .build()
        };

        queue.enqueue_many(vec![0, 1]).unwrap();
        queue.start().unwrap();
        queue.stop(true).unwrap();

        assert_eq!(queue.error().and_then(|e| e.stage()), Some(PipelineStage::Predicate));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_panic_reports_without_second_completion() {
        let queue = PredicateQueue::builder()
            .predicate(|_: &i64| true)
            .action(|_: &i64| Ok(()))
            .callback(|_: &i64| panic!("callback exploded"))
            .build();
        let events = queue.subscribe_channel("audit", EventFilter::All, "test");

        queue.enqueue(7).unwrap();
        queue.start().unwrap();
        queue.stop(true).unwrap();

        let events: Vec<_> = events.try_iter().collect();
        let completions: Vec<bool> = events
            .iter()
            .filter_map(|event| match event {
                QueueEvent::ActionCompleted(e) => Some(e.succeeded),
                _ => None,
            })
            .collect();
        assert_eq!(completions, vec![true]);

        let errors = events
            .iter()
            .filter(|event| matches!(event, QueueEvent::ErrorOccurred(_)))
            .count();
        assert_eq!(errors, 1);
        assert_eq!(
            queue.error().and_then(|e| e.stage()),
            Some(PipelineStage::Callback)
        );
    }

    #[test]
    fn test_drain_on_stop_offers_items_after_failures() {
        let (queue, seen) = failing_on(2);
        queue.enqueue_many(vec![1, 2, 3, 2, 4]).unwrap();
        queue.start().unwrap();
        queue.stop(true).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 3, 4]);
        assert_eq!(queue.items_in_queue(), 0);
        assert_eq!(queue.status(), QueueStatus::Stopped);
    }

    #[test]
    fn test_failure_while_stopping_keeps_final_status() {
        let (queue, _) = failing_on(9);
        let statuses = record_statuses(&queue);
        queue.start().unwrap();
        assert!(wait_for_idle(&queue));

        // Items still queued when the stop arrives fail during the final drain
        let statuses_before = statuses.lock().unwrap().len();
        queue.enqueue_many(vec![9, 9, 9]).unwrap();
        queue.stop(true).unwrap();

        assert_eq!(queue.status(), QueueStatus::Stopped);
        let tail: Vec<_> = statuses.lock().unwrap()[statuses_before..].to_vec();
        assert_eq!(tail.last(), Some(&QueueStatus::Stopped));
    }

    #[test]
    fn test_panicking_subscriber_does_not_stop_processing() {
        let (queue, seen) = failing_on(-1);
        queue.subscribe_fn("broken", EventFilter::All, "test", |_| {
            panic!("subscriber failure");
        });
        let healthy = queue.subscribe_channel("healthy", EventFilter::ActionOnly, "test");

        queue.start().unwrap();
        queue.enqueue_many(vec![1, 2, 3]).unwrap();
        queue.stop(true).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(healthy.try_iter().count(), 3);
        assert!(queue.error().is_none());
        let stats = queue.notifications().subscriber_statistics("broken").unwrap();
        assert!(stats.error_count() > 0);
    }
}
