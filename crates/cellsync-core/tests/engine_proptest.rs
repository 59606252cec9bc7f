use cellsync_core::{Cell, CellAttrs, CellGrid, SyncEngine};
use proptest::prelude::*;

fn arb_write() -> impl Strategy<Value = (usize, usize, u32, u32)> {
    (0usize..20, 0usize..10, any::<u32>(), any::<u32>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generations_strictly_increase_across_commits(writes in proptest::collection::vec(arb_write(), 1..20)) {
        let mut engine = SyncEngine::new(1, CellGrid::new(20, 10));
        let mut last_gen = 0u64;
        for (x, y, codepoint, fg) in writes {
            engine.write_cell(x, y, Cell::new(codepoint, fg, 0, CellAttrs::empty()));
            let snapshot = engine.commit();
            prop_assert!(snapshot.generation > last_gen);
            last_gen = snapshot.generation;
        }
    }

    #[test]
    fn apply_from_wire_is_idempotent(writes in proptest::collection::vec(arb_write(), 1..15)) {
        let mut producer = SyncEngine::new(1, CellGrid::new(20, 10));
        for (x, y, codepoint, fg) in &writes {
            producer.write_cell(*x, *y, Cell::new(*codepoint, *fg, 0, CellAttrs::empty()));
        }
        let snapshot = producer.commit();
        let wire = producer.snapshot_to_wire(&snapshot);

        let mut consumer = SyncEngine::new(2, CellGrid::new(20, 10));
        consumer.apply_from_wire(&wire).unwrap();
        let once: Vec<_> = (0..10).flat_map(|y| (0..20).map(move |x| (x, y)))
            .map(|(x, y)| consumer.grid().get_cell(x, y))
            .collect();
        consumer.apply_from_wire(&wire).unwrap();
        let twice: Vec<_> = (0..10).flat_map(|y| (0..20).map(move |x| (x, y)))
            .map(|(x, y)| consumer.grid().get_cell(x, y))
            .collect();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn acked_gen_equals_the_maximum_ack_seen(acks in proptest::collection::vec(0u64..1000, 1..30)) {
        let mut engine = SyncEngine::new(1, CellGrid::new(4, 4));
        let max = *acks.iter().max().unwrap();
        for gen in acks {
            engine.ack(7, gen);
        }
        prop_assert_eq!(engine.peer_state(7).unwrap().acked_gen, max);
    }

    #[test]
    fn log_ring_is_fifo_bounded_at_capacity(commit_count in 1usize..140) {
        let mut engine = SyncEngine::new(1, CellGrid::new(4, 4));
        for i in 0..commit_count {
            engine.write_cell(0, 0, Cell::new((i % 26) as u32 + b'a' as u32, 0, 0, CellAttrs::empty()));
            engine.commit();
        }
        if commit_count > 64 {
            // The oldest 64-entries-ago generation should already be evicted:
            // `packed_since` on a generation at or before the eviction point
            // must skip straight to the oldest still-cached entry.
            let oldest_retained = (commit_count - 64) as u64;
            prop_assert!(engine.packed_since(0).is_some());
            prop_assert!(engine.packed_since(oldest_retained).unwrap().len() > 0);
        } else {
            prop_assert!(engine.packed_since(0).is_some());
        }
    }
}
