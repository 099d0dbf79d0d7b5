//! Property-based invariant tests for the clipboard history.
//!
//! 1. Texts are unique
//! 2. Length never exceeds capacity
//! 3. The last inserted non-blank text is at the front
//! 4. Removed text is gone; removing absent text changes nothing
//! 5. Blank inserts change nothing
//! 6. Save then load reproduces the history exactly

use clipring::persist;
use clipring::{Entry, HistoryStore};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Insert(String),
    Remove(String),
    Resize(usize),
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-e]{1,2}",
        1 => "[ \t\n]{0,3}",
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => text_strategy().prop_map(Op::Insert),
        2 => text_strategy().prop_map(Op::Remove),
        1 => (0usize..8).prop_map(Op::Resize),
    ]
}

fn texts(store: &HistoryStore) -> Vec<String> {
    store.snapshot().into_iter().map(|e| e.text).collect()
}

fn assert_invariants(store: &HistoryStore) {
    let snapshot = store.snapshot();
    let unique: HashSet<_> = snapshot.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(unique.len(), snapshot.len(), "duplicate text in {:?}", snapshot);
    assert!(snapshot.len() <= store.capacity());
    assert!(store.capacity() >= 1);
    assert!(snapshot.iter().all(|e| !e.text.trim().is_empty()));
    assert!(
        snapshot.windows(2).all(|w| w[0].timestamp >= w[1].timestamp),
        "not in recency order: {:?}",
        snapshot
    );
}

proptest! {
    #[test]
    fn invariants_hold_after_every_op(
        capacity in 1usize..6,
        ops in proptest::collection::vec(op_strategy(), 0..60),
    ) {
        let store = HistoryStore::new(capacity);

        for op in ops {
            match op {
                Op::Insert(text) => {
                    let before = texts(&store);
                    store.insert(&text);
                    if text.trim().is_empty() {
                        prop_assert_eq!(texts(&store), before);
                    } else {
                        prop_assert_eq!(&texts(&store)[0], &text);
                    }
                }
                Op::Remove(text) => {
                    let before = texts(&store);
                    store.remove(&text);
                    let after = texts(&store);
                    prop_assert!(!after.contains(&text));
                    if !before.contains(&text) {
                        prop_assert_eq!(after, before);
                    }
                }
                Op::Resize(n) => {
                    let before = store.capacity();
                    store.resize(n);
                    let expected = if n == 0 { before } else { n };
                    prop_assert_eq!(store.capacity(), expected);
                }
            }
            assert_invariants(&store);
        }
    }

    #[test]
    fn save_load_round_trip(
        records in proptest::collection::vec(("\\PC{1,20}", 0i64..2_000_000_000), 0..20),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(persist::HISTORY_FILE_NAME);
        let entries: Vec<Entry> = records.into_iter().map(|(t, ts)| Entry::new(t, ts)).collect();

        persist::save(&path, &entries).unwrap();
        prop_assert_eq!(persist::load(&path), entries);
    }

    #[test]
    fn restore_matches_live_inserts(texts_in in proptest::collection::vec("[a-d]", 0..20)) {
        let live = HistoryStore::new(3);
        for t in &texts_in {
            live.insert(t);
        }

        let restored = HistoryStore::with_entries(3, live.snapshot());
        prop_assert_eq!(restored.snapshot(), live.snapshot());
    }
}
