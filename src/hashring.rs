//! Consistent hashing ring mapping a key to one of a fixed set of peer ids.
//!
//! Each real peer is placed on the ring `replicas` times under distinct
//! virtual-node names (`"{i}{peer_id}"`), which spreads a peer's share of
//! the keyspace across many small arcs instead of one big one — the usual
//! fix for the otherwise uneven load a single hash point per node produces.
//! Grounded in `original_source/consistenthash/consistenthash.go`; the
//! `Hash` trait/CRC32 default and binary-search `get` translate directly.

use std::collections::BTreeMap;

/// A pluggable hash function. The default is CRC32-IEEE, matching the
/// original `crc32.ChecksumIEEE`.
pub trait KeyHasher: Send + Sync {
    fn hash(&self, data: &[u8]) -> u32;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Crc32Hasher;

impl KeyHasher for Crc32Hasher {
    fn hash(&self, data: &[u8]) -> u32 {
        crc32fast::hash(data)
    }
}

/// Maps string keys onto a fixed set of peer ids.
pub struct HashRing {
    replicas: usize,
    hasher: Box<dyn KeyHasher>,
    // ring point -> peer id. BTreeMap keeps points sorted for `range` lookup
    // without a separate sort pass on every `add`.
    ring: BTreeMap<u32, String>,
}

impl HashRing {
    pub fn new(replicas: usize) -> Self {
        Self::with_hasher(replicas, Box::new(Crc32Hasher))
    }

    pub fn with_hasher(replicas: usize, hasher: Box<dyn KeyHasher>) -> Self {
        Self {
            replicas,
            hasher,
            ring: BTreeMap::new(),
        }
    }

    /// Adds peers to the ring. Idempotent per peer id: re-adding a peer
    /// already present just rewrites its existing virtual-node points.
    pub fn add(&mut self, peers: &[impl AsRef<str>]) {
        for peer in peers {
            let peer = peer.as_ref();
            for i in 0..self.replicas {
                let point = self.hasher.hash(format!("{i}{peer}").as_bytes());
                self.ring.insert(point, peer.to_string());
            }
        }
    }

    pub fn remove(&mut self, peer: &str) {
        for i in 0..self.replicas {
            let point = self.hasher.hash(format!("{i}{peer}").as_bytes());
            self.ring.remove(&point);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Returns the peer id owning `key`, or `None` if the ring is empty.
    ///
    /// Walks the ring clockwise from `hash(key)`, wrapping back to the
    /// smallest point if `hash(key)` is past every point present — the same
    /// `idx % len` wraparound the original does with a linear `keys` slice,
    /// expressed here as a `BTreeMap::range` lookup that falls back to
    /// `first_key_value`.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.ring.is_empty() {
            return None;
        }
        let hash = self.hasher.hash(key.as_bytes());
        let owner = self
            .ring
            .range(hash..)
            .next()
            .or_else(|| self.ring.iter().next())?;
        Some(owner.1.as_str())
    }
}

impl std::fmt::Debug for HashRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("points", &self.ring.len())
            .finish()
    }
}
