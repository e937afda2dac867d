//! Basic usage example for the distributed cache.
//!
//! Demonstrates a single group backed by a loader, then joining a two-node
//! peer cluster where each node forwards misses for keys the other owns.
//!
//! Run with: RUST_LOG=debug cargo run --example basic_usage, to see the
//! `debug!`/`info!`/`warn!` spans `src/group.rs` emits on cache hit, miss,
//! and peer fallback.

use dcache::{new_group, LoaderFn, PeerPool};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn main() {
    tracing_subscriber::fmt::init();

    single_node_example();
    peer_cluster_example();
}

fn single_node_example() {
    println!("== single node ==");

    let db: HashMap<&str, &str> = [("Tom", "630"), ("Jack", "589"), ("Sam", "567")]
        .into_iter()
        .collect();
    let load_count = Arc::new(AtomicUsize::new(0));
    let load_count_clone = load_count.clone();

    let group = new_group(
        "scores",
        2 << 10,
        Arc::new(LoaderFn::new(move |key: &str| {
            load_count_clone.fetch_add(1, Ordering::SeqCst);
            db.get(key)
                .map(|v| (*v).into())
                .ok_or_else(|| dcache::Error::NotFound(key.to_string()))
        })),
    );

    for key in ["Tom", "Tom", "Jack"] {
        let view = group.get(key).unwrap();
        println!("{key} => {}", String::from_utf8_lossy(&view.to_vec()));
    }
    println!("loader invoked {} time(s)", load_count.load(Ordering::SeqCst));
}

fn peer_cluster_example() {
    println!("== peer cluster (local stand-in, no real network) ==");

    // A real deployment would wire `dcache::transport::HttpPeerClient` into
    // `PeerPool::set`; here each "peer" is just another in-process group so
    // the example runs without a network.
    let make_group = |name: &str| {
        new_group(
            format!("shard-{name}"),
            1 << 20,
            Arc::new(LoaderFn::new(move |key: &str| Ok(format!("{name}:{key}").into()))),
        )
    };

    let node_a = make_group("a");
    let node_b = make_group("b");

    let pool = Arc::new(PeerPool::new("node-a"));
    pool.set(&["node-a", "node-b"], |id| {
        Arc::new(LoopbackPeerClient { id: id.to_string() })
    });
    node_a.register_peers(pool).unwrap();

    let view = node_a.get("user:42").unwrap();
    println!("node_a.get(\"user:42\") => {}", String::from_utf8_lossy(&view.to_vec()));

    // node_b participates in the same ring purely for illustration; this demo
    // doesn't dispatch real RPCs to it.
    let _ = &node_b;
}

struct LoopbackPeerClient {
    id: String,
}

impl dcache::PeerClient for LoopbackPeerClient {
    fn get(&self, group: &str, key: &str) -> dcache::Result<dcache::ByteView> {
        Ok(format!("{}:{group}:{key}", self.id).into())
    }
}
