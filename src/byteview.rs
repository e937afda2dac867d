//! An immutable view over a byte buffer.
//!
//! Values admitted to the cache are defensively copied into a `ByteView` on
//! the way in and the way back out, so a caller can never mutate bytes the
//! cache still owns, and the cache can never hand out a slice that a caller
//! mutates out from under a concurrent reader.

use std::fmt;
use std::sync::Arc;

/// A cheaply-cloneable, immutable slice of bytes.
///
/// Cloning a `ByteView` bumps a refcount; it never copies the underlying
/// buffer. `from_bytes`/`to_vec` are the only two points that copy, and both
/// do so deliberately — once on admission, once on handoff to a caller who
/// asked for an owned `Vec<u8>`.
#[derive(Clone)]
pub struct ByteView {
    bytes: Arc<[u8]>,
}

impl ByteView {
    /// Copies `bytes` into a new, independently-owned view.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: Arc::from(bytes),
        }
    }

    /// Takes ownership of an already-allocated buffer without copying.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::from(bytes.into_boxed_slice()),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Copies the bytes out into a caller-owned `Vec<u8>`.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Copies the bytes out as a `String`, for callers who know the value is
    /// valid UTF-8. Returns `None` otherwise rather than panicking.
    pub fn to_string_lossy_checked(&self) -> Option<String> {
        std::str::from_utf8(&self.bytes).ok().map(|s| s.to_owned())
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }
}

impl From<String> for ByteView {
    fn from(s: String) -> Self {
        Self::from_vec(s.into_bytes())
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

impl PartialEq for ByteView {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.as_ref() == other.bytes.as_ref()
    }
}

impl Eq for ByteView {}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView").field("len", &self.len()).finish()
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_copies_independently() {
        let mut src = vec![1, 2, 3];
        let view = ByteView::from_bytes(&src);
        src[0] = 99;
        assert_eq!(view.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn clone_shares_storage_but_stays_equal() {
        let view = ByteView::from_bytes(b"hello");
        let clone = view.clone();
        assert_eq!(view, clone);
        assert_eq!(clone.to_vec(), b"hello".to_vec());
    }

    #[test]
    fn to_string_lossy_checked_rejects_invalid_utf8() {
        let view = ByteView::from_bytes(&[0xff, 0xfe]);
        assert!(view.to_string_lossy_checked().is_none());
    }

    #[test]
    fn empty_view_reports_empty() {
        let view = ByteView::from_bytes(&[]);
        assert!(view.is_empty());
        assert_eq!(view.len(), 0);
    }
}
