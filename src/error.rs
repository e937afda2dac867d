//! Error types shared by every layer of the cache: the local store, a
//! group's orchestration, the consistent-hash ring's peer lookup, and the
//! HTTP transport.

use std::sync::Arc;
use thiserror::Error;

/// Everything that can go wrong calling into this crate.
///
/// `PeerTransport` is recoverable by design: a group's `get` catches it and
/// falls through to the local loader rather than propagating it to the
/// caller (graceful degradation when a peer is unreachable). Every other
/// variant is returned to the caller as-is.
///
/// `Clone`able (via an `Arc`-wrapped transport source, not a `Box`) so that
/// a singleflight call record can hand the exact same error to every waiter
/// without downgrading it to a string first — spec.md §7 requires loader
/// errors to "surface to the caller unchanged".
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A key was empty, or some other caller-supplied argument was invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The loader ran and found nothing for the key.
    #[error("not found: {0}")]
    NotFound(String),

    /// A peer could not be reached or returned a malformed response.
    ///
    /// Carries the peer id so a caller logging this can tell which peer
    /// failed without downcasting.
    #[error("peer transport error (peer {peer}): {source}")]
    PeerTransport {
        peer: String,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// A setup invariant was violated: `RegisterPeers` called twice, or a
    /// group constructed with no loader.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An invariant internal to the cache was violated. This should never
    /// happen in correct code; treat it the same as a panic.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn peer_transport(
        peer: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::PeerTransport {
            peer: peer.into(),
            source: Arc::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
