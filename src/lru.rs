//! A size-bounded, order-preserving LRU store.
//!
//! This is the engine beneath a [`crate::Group`]'s local cache: a hash map
//! from key to list position, backed by the intrusive doubly-linked list in
//! [`crate::list`]. Unlike a classic entry-count LRU, capacity here is
//! measured in accounted bytes (`len(key) + len(value)`), matching the
//! groupcache-style store this crate generalizes from `cache-rs`'s
//! entry-count-and-size dual-limit design down to size alone.
//!
//! ## Eviction
//!
//! `add` evicts from the tail in a loop until `current_bytes <= max_bytes`
//! (a `max_bytes` of `0` disables the bound entirely). A single-eviction
//! `if` is not enough: a newly added value larger than the freed slack would
//! leave the store over budget. This loop form is also what `cache-rs`'s own
//! `put_with_size` already does; the single-eviction version lives only in
//! older non-Rust ports of this same design.
//!
//! ## Safety
//!
//! The map stores raw pointers into nodes owned by `list`. Those pointers
//! stay valid as long as the node hasn't been removed and the store hasn't
//! been dropped — the same invariant `cache-rs`'s segment maintains.

use crate::entry::CacheEntry;
use crate::list::{Entry as ListEntry, List};
use hashbrown::DefaultHashBuilder;
use hashbrown::HashMap;
use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};
use std::num::NonZeroUsize;

/// Anything whose "size" can be accounted in the byte budget.
///
/// Implemented for the `String` keys and [`crate::ByteView`] values this
/// store is built for; a caller plugging in other key/value types need only
/// implement this once.
pub trait ByteLen {
    fn byte_len(&self) -> u64;
}

impl ByteLen for String {
    fn byte_len(&self) -> u64 {
        self.len() as u64
    }
}

impl ByteLen for &str {
    fn byte_len(&self) -> u64 {
        self.len() as u64
    }
}

impl ByteLen for crate::ByteView {
    fn byte_len(&self) -> u64 {
        self.len() as u64
    }
}

/// A size-bounded LRU store.
///
/// `max_bytes == 0` means unbounded — no eviction is ever triggered, mirroring
/// the original `New(maxBytes, onEvicted)` constructor where a zero budget
/// disables the bound rather than evicting everything immediately.
pub struct LruStore<K, V, S = DefaultHashBuilder> {
    list: List<CacheEntry<K, V>>,
    map: HashMap<K, *mut ListEntry<CacheEntry<K, V>>, S>,
    max_bytes: u64,
    current_bytes: u64,
    evictions: u64,
    on_evicted: Option<Box<dyn FnMut(&K, &V) + Send>>,
}

// SAFETY: LruStore owns every node its map points into; the pointers never
// escape and all mutation requires `&mut self`.
unsafe impl<K: Send, V: Send, S: Send> Send for LruStore<K, V, S> {}
unsafe impl<K: Send, V: Send, S: Sync> Sync for LruStore<K, V, S> {}

impl<K, V> LruStore<K, V, DefaultHashBuilder>
where
    K: Hash + Eq + Clone + ByteLen,
    V: ByteLen,
{
    /// Creates a store bounded to `max_bytes` accounted bytes, with no
    /// eviction callback.
    pub fn new(max_bytes: u64) -> Self {
        Self::with_hasher(max_bytes, DefaultHashBuilder::default())
    }

    /// Creates a store bounded to `max_bytes` accounted bytes, invoking
    /// `on_evicted(key, value)` for every entry evicted by `add` (never for
    /// entries removed by an explicit `remove`).
    pub fn with_on_evicted(
        max_bytes: u64,
        on_evicted: impl FnMut(&K, &V) + Send + 'static,
    ) -> Self {
        let mut store = Self::new(max_bytes);
        store.on_evicted = Some(Box::new(on_evicted));
        store
    }
}

impl<K, V, S> LruStore<K, V, S>
where
    K: Hash + Eq + Clone + ByteLen,
    V: ByteLen,
    S: BuildHasher,
{
    pub fn with_hasher(max_bytes: u64, hash_builder: S) -> Self {
        Self {
            list: List::new(NonZeroUsize::MAX),
            map: HashMap::with_hasher(hash_builder),
            max_bytes,
            current_bytes: 0,
            evictions: 0,
            on_evicted: None,
        }
    }

    /// Number of entries currently held. Must always equal the list's own
    /// length; a mismatch is a fatal invariant breach (see `check_len`).
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn current_bytes(&self) -> u64 {
        self.current_bytes
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Total number of entries evicted by `add`'s size-budget loop over this
    /// store's lifetime (not incremented by explicit `remove` calls).
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Panics if the map and list have disagreed about membership. A
    /// programming bug or memory corruption, not a recoverable condition.
    fn check_len(&self) {
        if self.map.len() != self.list.len() {
            panic!(
                "lru store invariant breach: map len {} != list len {}",
                self.map.len(),
                self.list.len()
            );
        }
    }

    /// Looks up `key`, moving it to the front (most-recently-used) on a hit.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = *self.map.get(key)?;
        unsafe {
            self.list.move_to_front(node);
            let entry = (*node).get_value_mut();
            entry.touch();
            Some(&entry.value)
        }
    }

    /// Inserts or overwrites `key`, evicting from the tail until the size
    /// budget holds.
    pub fn add(&mut self, key: K, value: V) {
        let size = key.byte_len() + value.byte_len();

        if let Some(&node) = self.map.get(&key) {
            unsafe {
                self.list.move_to_front(node);
                let entry = (*node).get_value_mut();
                self.current_bytes = self.current_bytes.saturating_sub(entry.size);
                entry.value = value;
                entry.size = size;
                entry.touch();
                self.current_bytes += size;
            }
            self.evict_until_within_budget();
            self.check_len();
            return;
        }

        let cache_entry = CacheEntry::new(key.clone(), value, size);
        if let Some(node) = self.list.add(cache_entry) {
            self.map.insert(key, node);
            self.current_bytes += size;
        }
        self.evict_until_within_budget();
        self.check_len();
    }

    fn evict_until_within_budget(&mut self) {
        if self.max_bytes == 0 {
            return;
        }
        while self.current_bytes > self.max_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
        }
    }

    /// Evicts and returns the least-recently-used entry, running the
    /// eviction callback if one is registered. This is the store's `Remove`
    /// operation — also used internally by `add`'s eviction loop.
    pub fn remove_oldest(&mut self) -> Option<(K, V)> {
        let boxed = self.list.remove_last()?;
        let entry = unsafe { (*boxed).into_value() };
        self.map.remove(&entry.key);
        self.current_bytes = self.current_bytes.saturating_sub(entry.size);
        self.evictions += 1;
        if let Some(cb) = self.on_evicted.as_mut() {
            cb(&entry.key, &entry.value);
        }
        Some((entry.key, entry.value))
    }

    /// Removes `key` outright without running the eviction callback.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.remove(key)?;
        unsafe {
            let boxed = self.list.remove(node)?;
            let entry = (*boxed).into_value();
            self.current_bytes = self.current_bytes.saturating_sub(entry.size);
            Some(entry.value)
        }
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.list.clear();
        self.current_bytes = 0;
    }
}

impl<K, V, S> std::fmt::Debug for LruStore<K, V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruStore")
            .field("len", &self.map.len())
            .field("current_bytes", &self.current_bytes)
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ByteView;

    fn entry_size(key: &str, value: &str) -> u64 {
        key.len() as u64 + value.len() as u64
    }

    #[test]
    fn eviction_order_matches_capacity() {
        let cap = entry_size("key1", "value") + entry_size("key2", "v2");
        let mut store: LruStore<String, ByteView> = LruStore::new(cap);

        store.add("key1".to_string(), ByteView::from("value"));
        store.add("key2".to_string(), ByteView::from("v2"));
        store.add("k3".to_string(), ByteView::from("value3"));

        assert!(store.get("key1").is_none());
        assert_eq!(store.len(), 2);
        assert_eq!(store.evictions(), 1);
    }

    #[test]
    fn updating_an_existing_key_does_not_increment_evictions() {
        let mut store: LruStore<String, ByteView> = LruStore::new(1024);
        store.add("k".to_string(), ByteView::from("v1"));
        store.add("k".to_string(), ByteView::from("v2"));
        assert_eq!(store.evictions(), 0);
    }

    #[test]
    fn eviction_callback_receives_evicted_pair() {
        use std::sync::{Arc, Mutex};
        let seen: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let cap = entry_size("key1", "value") + entry_size("key2", "v2");
        let mut store: LruStore<String, ByteView> = LruStore::with_on_evicted(cap, move |k, v| {
            seen_clone
                .lock()
                .unwrap()
                .push((k.clone(), v.to_string_lossy_checked().unwrap()));
        });

        store.add("key1".to_string(), ByteView::from("value"));
        store.add("key2".to_string(), ByteView::from("v2"));
        store.add("k3".to_string(), ByteView::from("value3"));

        let evicted = seen.lock().unwrap();
        assert_eq!(evicted.as_slice(), &[("key1".to_string(), "value".to_string())]);
    }

    #[test]
    fn zero_max_bytes_disables_eviction() {
        let mut store: LruStore<String, ByteView> = LruStore::new(0);
        for i in 0..1000 {
            store.add(format!("k{i}"), ByteView::from("v"));
        }
        assert_eq!(store.len(), 1000);
    }

    #[test]
    fn get_moves_entry_to_front() {
        let mut store: LruStore<String, ByteView> = LruStore::new(0);
        store.add("a".to_string(), ByteView::from("1"));
        store.add("b".to_string(), ByteView::from("2"));
        store.add("c".to_string(), ByteView::from("3"));

        assert!(store.get("a").is_some());
        // "a" is now MRU; force an eviction bound and confirm "b" goes first.
        let cap = entry_size("a", "1") + entry_size("c", "3");
        let mut bounded: LruStore<String, ByteView> = LruStore::new(cap);
        bounded.add("b".to_string(), ByteView::from("2"));
        bounded.add("a".to_string(), ByteView::from("1"));
        bounded.get("b");
        bounded.add("c".to_string(), ByteView::from("3"));
        assert!(bounded.get("a").is_none());
        assert!(bounded.get("b").is_some());
    }

    #[test]
    fn loop_eviction_handles_oversized_replacement() {
        // A value larger than the freed slack must still bring curBytes
        // back under budget, which requires the loop form, not a single `if`.
        let cap = 10u64;
        let mut store: LruStore<String, ByteView> = LruStore::new(cap);
        store.add("a".to_string(), ByteView::from("12345")); // size 6
        store.add("b".to_string(), ByteView::from("123")); // size 4, total 10
        store.add("c".to_string(), ByteView::from("123456789")); // size 10, must evict both
        assert!(store.current_bytes() <= cap);
        assert!(store.get("a").is_none());
        assert!(store.get("b").is_none());
        assert!(store.get("c").is_some());
    }

    #[test]
    fn remove_does_not_invoke_eviction_callback() {
        use std::sync::{Arc, Mutex};
        let calls = Arc::new(Mutex::new(0));
        let calls_clone = calls.clone();
        let mut store: LruStore<String, ByteView> =
            LruStore::with_on_evicted(0, move |_, _| *calls_clone.lock().unwrap() += 1);
        store.add("a".to_string(), ByteView::from("1"));
        store.remove("a");
        assert_eq!(*calls.lock().unwrap(), 0);
    }
}
