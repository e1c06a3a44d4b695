//! Tests for producers and observers on other threads

#[cfg(test)]
mod tests {
    use crate::queue::api::{PredicateQueue, QueueStatus};
    use crate::queue::tests::{summing_queue, wait_for_idle, wait_until};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier, Mutex};
    use std::thread;

    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 250;

    #[test]
    fn test_concurrent_producers_keep_their_own_order() {
        let seen: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));
        let queue = {
            let seen = Arc::clone(&seen);
            Arc::new(
                PredicateQueue::builder()
                    .name("producers")
                    .predicate(|_: &(usize, usize)| true)
                    .action(move |item: &(usize, usize)| {
                        seen.lock().unwrap().push(*item);
                        Ok(())
                    })
                    .build(),
            )
        };
        queue.start().unwrap();

        let barrier = Arc::new(Barrier::new(PRODUCERS));
        let handles: Vec<_> = (0..PRODUCERS)
            .map(|producer| {
                let queue = Arc::clone(&queue);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for n in 0..PER_PRODUCER {
                        queue.enqueue((producer, n)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        queue.stop(true).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), PRODUCERS * PER_PRODUCER);

        let mut next: HashMap<usize, usize> = HashMap::new();
        for (producer, n) in seen.iter() {
            let expected = next.entry(*producer).or_insert(0);
            assert_eq!(n, expected, "producer {} out of order", producer);
            *expected += 1;
        }
    }

    #[test]
    fn test_batches_stay_contiguous() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let queue = {
            let seen = Arc::clone(&seen);
            Arc::new(
                PredicateQueue::builder()
                    .predicate(|_: &(usize, usize)| true)
                    .action(move |item: &(usize, usize)| {
                        seen.lock().unwrap().push(*item);
                        Ok(())
                    })
                    .build(),
            )
        };
        queue.start().unwrap();

        let handles: Vec<_> = (0..PRODUCERS)
            .map(|producer| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for batch in 0..10 {
                        let items = (0..20).map(move |n| (producer, batch * 20 + n));
                        queue.enqueue_many(items).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        queue.stop(true).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), PRODUCERS * 200);
        for chunk in seen.chunks(20) {
            let producer = chunk[0].0;
            assert!(chunk.iter().all(|(p, _)| *p == producer));
            assert!(chunk.windows(2).all(|pair| pair[1].1 == pair[0].1 + 1));
        }
    }

    #[test]
    fn test_stop_while_producing_loses_nothing_accepted() {
        let (queue, tally) = summing_queue(|_| true);
        let queue = Arc::new(queue);
        queue.start().unwrap();

        let accepted = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..PRODUCERS)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let accepted = Arc::clone(&accepted);
                thread::spawn(move || {
                    for _ in 0..PER_PRODUCER {
                        if queue.enqueue(1).is_ok() {
                            accepted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();

        assert!(wait_until(|| tally.calls() > 0));
        queue.stop(true).unwrap();
        for handle in handles {
            handle.join().unwrap();
        }

        // Anything not drained is still in the store
        assert_eq!(
            tally.calls() + queue.items_in_queue(),
            accepted.load(Ordering::SeqCst)
        );
    }

    #[test]
    fn test_callback_can_enqueue_follow_up_items() {
        let queue: Arc<PredicateQueue<u32>> = Arc::new(PredicateQueue::with_name("follow-up"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let seen = Arc::clone(&seen);
            queue.set_predicate(Some(|_: &u32| true)).unwrap();
            queue
                .set_action(Some(move |v: &u32| {
                    seen.lock().unwrap().push(*v);
                    Ok(())
                }))
                .unwrap();
            let weak = Arc::downgrade(&queue);
            queue
                .set_callback(Some(move |v: &u32| {
                    if *v < 5 {
                        if let Some(queue) = weak.upgrade() {
                            queue.enqueue(v + 1).unwrap();
                        }
                    }
                }))
                .unwrap();
        }

        queue.start().unwrap();
        queue.enqueue(0).unwrap();
        assert!(wait_until(|| seen.lock().unwrap().len() == 6));
        assert!(wait_for_idle(&queue));
        queue.stop(true).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_status_readable_while_processing() {
        let (queue, tally) = summing_queue(|_| true);
        let queue = Arc::new(queue);
        queue.start().unwrap();

        let reader = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for _ in 0..1000 {
                    let state = queue.state();
                    assert!(!state.cancellation_requested);
                    assert!(matches!(
                        state.status,
                        QueueStatus::Starting | QueueStatus::Processing | QueueStatus::Waiting
                    ));
                    let _ = queue.items_in_queue();
                }
            })
        };

        queue.enqueue_many(0..1000).unwrap();
        reader.join().unwrap();
        queue.stop(true).unwrap();
        assert_eq!(tally.calls(), 1000);
    }
}
