#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Minimal usage
//!
//! ```
//! use dcache::{new_group, LoaderFn};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! let db: HashMap<&str, &str> = [("Tom", "630"), ("Jack", "589")].into_iter().collect();
//! let group = new_group(
//!     "sources",
//!     2 << 10,
//!     Arc::new(LoaderFn::new(move |key: &str| {
//!         db.get(key)
//!             .map(|v| (*v).into())
//!             .ok_or_else(|| dcache::Error::NotFound(key.to_string()))
//!     })),
//! );
//!
//! let view = group.get("Tom").unwrap();
//! assert_eq!(view.to_vec(), b"630".to_vec());
//! ```
//!
//! ## Joining a peer cluster
//!
//! ```
//! use dcache::{new_group, LoaderFn, PeerPool};
//! use std::sync::Arc;
//!
//! let group = new_group("shared", 1 << 20, Arc::new(LoaderFn::new(|_: &str| {
//!     Err(dcache::Error::NotFound("no backing source configured".into()))
//! })));
//!
//! let pool = Arc::new(PeerPool::new("http://10.0.0.1:8001"));
//! pool.set(
//!     &["http://10.0.0.1:8001", "http://10.0.0.2:8001", "http://10.0.0.3:8001"],
//!     |addr| Arc::new(dcache::transport::HttpPeerClient::new(addr)),
//! );
//! group.register_peers(pool).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`group`]: the `Group` namespace — local cache, peer picker, loader
//! - [`lru`]: the size-bounded LRU store underneath a group's local cache
//! - [`concurrent`]: the thread-safe, lazily-initialized wrapper around it
//! - [`hashring`]: consistent-hash key-to-peer routing
//! - [`singleflight`]: in-flight request deduplication
//! - [`peer`]: `PeerPicker` / `PeerClient` traits and the `PeerPool` default
//! - [`transport`]: the concrete HTTP wire binding
//! - [`byteview`]: the immutable, defensively-copied value type
//! - [`error`]: the crate's error enum
//! - [`metrics`]: per-group hit/miss/eviction counters

pub mod byteview;
pub mod concurrent;
mod entry;
pub mod error;
pub mod group;
pub mod hashring;
pub(crate) mod list;
pub mod lru;
pub mod metrics;
pub mod peer;
pub mod singleflight;
pub mod transport;

pub use byteview::ByteView;
pub use concurrent::ConcurrentCache;
pub use error::{Error, Result};
pub use group::{get_group, new_group, Group, Loader, LoaderFn};
pub use hashring::{Crc32Hasher, HashRing, KeyHasher};
pub use lru::LruStore;
pub use peer::{PeerClient, PeerPicker, PeerPool};
pub use singleflight::SingleFlightGroup;
