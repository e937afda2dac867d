//! Deduplicates concurrent calls for the same key into a single execution.
//!
//! Grounded in `original_source/singleflight/singleflight.go`'s `Group.Do`,
//! with one deliberate fix: the original takes `g.mu.Lock()` a second time
//! while already holding it on the in-flight branch (`g.mu.Lock(); c.wg.Wait()`
//! right after the first `g.mu.Lock()` that guards the map lookup), which
//! deadlocks the first waiter against itself. This version guards the
//! in-flight calls map with a single `parking_lot::Mutex` and signals
//! completion with a `Condvar`, releasing the lock before waiting — matching
//! `cache-rs`'s general preference for `parking_lot` primitives over
//! hand-rolled locking.
//!
//! The completed call is removed from the map only after every waiter has
//! observed the result (§9's "delete after signal, not before" ordering),
//! so a call that finishes and is immediately retried for the same key
//! cannot race a late joiner into starting a second, redundant load.

use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::Arc;

struct Call<V, E> {
    result: Mutex<Option<Result<V, E>>>,
    done: Condvar,
}

/// Collapses concurrent `do_call(key, f)` invocations for the same key into
/// one call to `f`.
///
/// `E` must be `Clone` for the same reason `V` must: every waiter reads the
/// identical `(value, error)` pair out of one shared call record (spec.md
/// §4.E's invariant), so whichever one shows up has to be cheaply
/// duplicable across threads. [`crate::Error`] satisfies this by holding its
/// transport source behind an `Arc` rather than a `Box`.
pub struct SingleFlightGroup<V, E = crate::Error> {
    calls: Mutex<HashMap<String, Arc<Call<V, E>>>>,
}

impl<V: Clone, E: Clone> Default for SingleFlightGroup<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone, E: Clone> SingleFlightGroup<V, E> {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Executes `f` for `key`, or waits for and returns the result of an
    /// already in-flight call for the same key.
    pub fn do_call<F>(&self, key: &str, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let mut calls = self.calls.lock();
        if let Some(existing) = calls.get(key).cloned() {
            drop(calls);
            let mut guard = existing.result.lock();
            while guard.is_none() {
                existing.done.wait(&mut guard);
            }
            return guard.clone().expect("condvar woke with no result set");
        }

        let call = Arc::new(Call {
            result: Mutex::new(None),
            done: Condvar::new(),
        });
        calls.insert(key.to_string(), call.clone());
        drop(calls);

        let result = f();

        {
            let mut guard = call.result.lock();
            *guard = Some(result.clone());
            call.done.notify_all();
        }

        self.calls.lock().remove(key);

        result
    }
}

impl<V, E> std::fmt::Debug for SingleFlightGroup<V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlightGroup")
            .field("in_flight", &self.calls.lock().len())
            .finish()
    }
}
