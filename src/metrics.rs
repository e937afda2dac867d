//! Lightweight hit/miss/eviction counters for a group's local cache.
//!
//! Grounded in `cache-rs`'s `metrics` module (a per-algorithm counters trait);
//! trimmed down to the fields this crate's scenarios actually consult: local
//! hits, local misses, evictions, and bytes currently held. Peer-fetch counts
//! live on [`crate::Group`] instead, since a peer hit never touches the local
//! [`crate::concurrent::ConcurrentCache`] these counters describe.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time counter values, returned by [`CacheMetrics::snapshot`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub bytes: u64,
}

/// Atomic counters a [`crate::concurrent::ConcurrentCache`] updates on every
/// operation. Reads never block writers: every field is a relaxed/seqcst
/// atomic, so `snapshot()` may observe a torn-but-monotonic view under
/// concurrent access, which is adequate for operator-facing hit-rate numbers.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, bytes: u64) -> MetricsSnapshot {
        MetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            bytes,
        }
    }
}
