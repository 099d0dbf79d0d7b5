use clipring::HistoryStore;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

const CAPACITY: usize = 16;

#[test]
fn readers_never_see_a_broken_history() {
    let store = Arc::new(HistoryStore::new(CAPACITY));
    let done = Arc::new(AtomicBool::new(false));

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..2_000 {
                    let text = format!("t{}", (i * 7 + w) % 40);
                    store.insert(&text);
                    if i % 5 == 0 {
                        store.remove(&format!("t{}", i % 40));
                    }
                    if i % 97 == 0 {
                        store.resize(CAPACITY - (i % 3));
                    }
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut checks = 0usize;
                while !done.load(Ordering::Acquire) || checks == 0 {
                    let snapshot = store.snapshot();
                    let unique: HashSet<_> = snapshot.iter().map(|e| &e.text).collect();
                    assert_eq!(unique.len(), snapshot.len());
                    assert!(snapshot.len() <= CAPACITY);
                    checks += 1;
                }
                checks
            })
        })
        .collect();

    for w in writers {
        w.join().unwrap();
    }
    done.store(true, Ordering::Release);

    for r in readers {
        assert!(r.join().unwrap() > 0);
    }

    assert!(store.len() <= store.capacity());
}

#[test]
fn concurrent_inserts_of_one_text_keep_one_entry() {
    let store = Arc::new(HistoryStore::new(CAPACITY));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..500 {
                    store.insert("same");
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.len(), 1);
}
