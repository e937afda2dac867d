//! A blocking HTTP [`crate::peer::PeerClient`], the concrete transport
//! spec.md §6 describes as "if provided" and `SPEC_FULL.md` §4.I promotes to
//! "provided".
//!
//! Grounded in `original_source/http.go`'s `HTTPPool` (the client side of
//! that struct: `ServeHTTP` dispatches, the implicit client side is whatever
//! issues the request `ServeHTTP` answers). This crate keeps the blocking
//! `net/http`-style model — `ureq` rather than `reqwest`/`hyper` — since
//! nothing else in this crate needs an async runtime (`SPEC_FULL.md` §5).

use std::io::Read;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::peer::PeerClient;
use crate::transport::path::{build_path, DEFAULT_BASE_PATH};
use crate::ByteView;

/// Fetches `(group, key)` from one peer over HTTP.
///
/// `addr` is the peer's base URL, e.g. `http://10.0.0.2:8001`. Non-200
/// responses and any transport-level failure (connection refused, timeout,
/// malformed response) are mapped to `Error::PeerTransport`, matching
/// spec.md §7's "any failure contacting a peer" — status-code granularity
/// (400/404/500) is the server's concern, not the client's: the client only
/// needs to know "did this peer answer with the value or not".
pub struct HttpPeerClient {
    addr: String,
    base_path: String,
    timeout: Duration,
}

impl HttpPeerClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl PeerClient for HttpPeerClient {
    fn get(&self, group: &str, key: &str) -> Result<ByteView> {
        let path = build_path(&self.base_path, group, key);
        let url = format!("{}{}", self.addr.trim_end_matches('/'), path);

        let response = ureq::get(&url)
            .timeout(self.timeout)
            .call()
            .map_err(|e| Error::peer_transport(self.addr.clone(), e))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| Error::peer_transport(self.addr.clone(), e))?;

        Ok(ByteView::from_vec(bytes))
    }
}

impl std::fmt::Debug for HttpPeerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPeerClient").field("addr", &self.addr).finish()
    }
}
