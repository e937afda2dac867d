//! The pluggable transport seam: `PeerPicker` maps a key to its owning peer,
//! `PeerClient` fetches a value from a specific peer. [`PeerPool`] is the one
//! concrete `PeerPicker` this crate ships, built on [`crate::hashring`].
//!
//! Grounded in `original_source/peers.go` (`PeerPicker`/`PeerGetter`, renamed
//! `PeerClient` here since "Getter" is already the loader's name in this
//! crate) and `http.go`'s `HTTPPool`, which plays both `PeerPicker` and the
//! server side of the transport — split here into [`PeerPool`] (picker) and
//! [`crate::transport::HttpPeerClient`] (client), since a trait object is a
//! cleaner seam than one struct wearing both hats.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::hashring::HashRing;
use crate::ByteView;

/// Fetches a value for `(group, key)` from one specific remote peer.
///
/// Implementations perform blocking network I/O; the crate ships
/// [`crate::transport::HttpPeerClient`] as the default.
pub trait PeerClient: Send + Sync {
    fn get(&self, group: &str, key: &str) -> Result<ByteView>;
}

/// Maps a key to the `PeerClient` that owns it.
///
/// `pick_peer` returns `None` when the ring is empty or the computed owner is
/// this node itself — in both cases the caller should fall back to its local
/// loader rather than make a round trip to itself.
pub trait PeerPicker: Send + Sync {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerClient>>;
}

/// The default `PeerPicker`: a consistent-hash ring plus one `PeerClient` per
/// real peer, keyed by peer id.
///
/// Owns `self_id` (never returned from `pick_peer`, even if the ring elects
/// it — that's the "we are the owner" decline case), the ring, and a map from
/// peer id to its client. `set` is the only mutator; it replaces the whole
/// peer set and is meant to be called once at startup (spec.md's peer set is
/// "configured once at registration" — dynamic membership is a Non-goal).
pub struct PeerPool {
    self_id: String,
    replicas: usize,
    state: Mutex<PoolState>,
}

struct PoolState {
    ring: HashRing,
    clients: HashMap<String, Arc<dyn PeerClient>>,
}

const DEFAULT_REPLICAS: usize = 3;

impl PeerPool {
    pub fn new(self_id: impl Into<String>) -> Self {
        Self::with_replicas(self_id, DEFAULT_REPLICAS)
    }

    pub fn with_replicas(self_id: impl Into<String>, replicas: usize) -> Self {
        Self {
            self_id: self_id.into(),
            replicas,
            state: Mutex::new(PoolState {
                ring: HashRing::new(replicas),
                clients: HashMap::new(),
            }),
        }
    }

    /// Replaces the peer set: rebuilds the ring with `replicas` virtual nodes
    /// per peer and re-derives one client per peer id via `make_client`.
    pub fn set(&self, peer_ids: &[impl AsRef<str>], make_client: impl Fn(&str) -> Arc<dyn PeerClient>) {
        let mut ring = HashRing::new(self.replicas);
        ring.add(peer_ids);
        let clients = peer_ids
            .iter()
            .map(|p| {
                let id = p.as_ref().to_string();
                let client = make_client(&id);
                (id, client)
            })
            .collect();
        let mut state = self.state.lock();
        *state = PoolState { ring, clients };
    }

    pub fn self_id(&self) -> &str {
        &self.self_id
    }
}

impl PeerPicker for PeerPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerClient>> {
        let state = self.state.lock();
        let owner = state.ring.get(key)?;
        if owner == self.self_id {
            return None;
        }
        state.clients.get(owner).cloned()
    }
}

impl std::fmt::Debug for PeerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PeerPool")
            .field("self_id", &self.self_id)
            .field("peers", &state.clients.len())
            .finish()
    }
}
