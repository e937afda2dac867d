//! Stress tests for the concurrent cache, group orchestration, and
//! singleflight under high contention.
//!
//! These verify thread safety and correctness, not throughput: the
//! assertions are about invariants holding (size bound, map/list agreement,
//! singleflight fan-in), not about timing.

use dcache::{new_group, ConcurrentCache, Error, LoaderFn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

const NUM_THREADS: usize = 16;
const OPS_PER_THREAD: usize = 2_000;

#[test]
fn stress_concurrent_cache_high_contention() {
    let cache = Arc::new(ConcurrentCache::new(1024));

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                let key = format!("k{}", i % 10); // only 10 keys, heavy contention
                if t % 2 == 0 {
                    cache.add(key, dcache::ByteView::from("v"));
                } else {
                    let _ = cache.get(&key);
                }
            }
        }));
    }
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert!(cache.bytes() <= 1024);
    assert!(cache.len() <= 10);
}

#[test]
fn stress_concurrent_cache_unbounded_never_drops_distinct_keys() {
    let cache = Arc::new(ConcurrentCache::new(0));

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                let key = format!("k-{t}-{i}");
                cache.add(key.clone(), dcache::ByteView::from("v"));
                assert!(cache.get(&key).is_some());
            }
        }));
    }
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert_eq!(cache.len(), NUM_THREADS * OPS_PER_THREAD);
}

#[test]
fn stress_group_get_under_concurrent_misses_and_hits() {
    let load_count = Arc::new(AtomicUsize::new(0));
    let load_count_clone = load_count.clone();
    let group = new_group(
        "stress-group",
        64 * 1024,
        Arc::new(LoaderFn::new(move |key: &str| {
            load_count_clone.fetch_add(1, Ordering::SeqCst);
            Ok(dcache::ByteView::from(key.to_string()))
        })),
    );

    let mut handles = Vec::new();
    for _ in 0..NUM_THREADS {
        let group = group.clone();
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                let key = format!("key-{}", i % 20); // shared keyspace, forces singleflight fan-in
                let view = group.get(&key).unwrap();
                assert_eq!(view.to_vec(), key.into_bytes());
            }
        }));
    }
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    // Every key was loaded at most a small, bounded number of times: once
    // per distinct (load, reload-after-completion) cycle, never once per op.
    assert!(load_count.load(Ordering::SeqCst) <= 20 * NUM_THREADS);
}

#[test]
fn stress_group_rejects_empty_key_under_concurrency() {
    let group = new_group(
        "stress-empty-key",
        1024,
        Arc::new(LoaderFn::new(|_: &str| Ok(dcache::ByteView::from("v")))),
    );

    let mut handles = Vec::new();
    for _ in 0..NUM_THREADS {
        let group = group.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                assert!(matches!(group.get(""), Err(Error::InvalidArgument(_))));
            }
        }));
    }
    for handle in handles {
        handle.join().expect("thread panicked");
    }
}
