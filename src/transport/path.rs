//! Pure path encode/decode for the HTTP wire binding, split out from
//! [`super::http`] so the `/<basePath>/<group>/<key>` contract (spec.md §6)
//! is unit-testable without a running server.
//!
//! Grounded in `original_source/http.go`'s `ServeHTTP`, which builds the path
//! with plain string concatenation and splits it with `strings.SplitN(...,
//! "/", 2)` — no percent-encoding at all, so a key containing `/` silently
//! breaks the original's routing. This crate's wire contract (spec.md §6)
//! calls for group and key to be "percent-encoded", so `build_path`/
//! `parse_path` close that gap with the `percent-encoding` crate rather than
//! reproducing the bug.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::error::{Error, Result};

pub const DEFAULT_BASE_PATH: &str = "/_cache/";

/// Characters percent-encoded in a path segment beyond the base `CONTROLS`
/// set: `/` (so an encoded key/group can never introduce an extra path
/// segment) plus the handful of characters that are reserved in a path.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

/// Builds `{base_path}{group}/{key}` with `group` and `key` each
/// percent-encoded as a single path segment.
pub fn build_path(base_path: &str, group: &str, key: &str) -> String {
    let mut base_path = base_path.to_string();
    if !base_path.ends_with('/') {
        base_path.push('/');
    }
    format!(
        "{base_path}{}/{}",
        utf8_percent_encode(group, PATH_SEGMENT),
        utf8_percent_encode(key, PATH_SEGMENT),
    )
}

/// Parses `path` back into `(group, key)`, the inverse of `build_path`.
///
/// Returns `Error::InvalidArgument` if `path` doesn't start with
/// `base_path`, or doesn't contain exactly two `/`-delimited segments after
/// it — the "400 malformed path" case in spec.md §6.
pub fn parse_path(base_path: &str, path: &str) -> Result<(String, String)> {
    let mut base_path = base_path.to_string();
    if !base_path.ends_with('/') {
        base_path.push('/');
    }

    let rest = path.strip_prefix(base_path.as_str()).ok_or_else(|| {
        Error::InvalidArgument(format!("path {path:?} does not start with base path {base_path:?}"))
    })?;

    let mut parts = rest.splitn(2, '/');
    let group = parts.next().filter(|s| !s.is_empty());
    let key = parts.next().filter(|s| !s.is_empty());
    let (group, key) = match (group, key) {
        (Some(g), Some(k)) => (g, k),
        _ => return Err(Error::InvalidArgument(format!("malformed cache path: {path:?}"))),
    };

    let group = percent_decode_str(group)
        .decode_utf8()
        .map_err(|e| Error::InvalidArgument(format!("invalid group encoding: {e}")))?
        .into_owned();
    let key = percent_decode_str(key)
        .decode_utf8()
        .map_err(|e| Error::InvalidArgument(format!("invalid key encoding: {e}")))?
        .into_owned();

    Ok((group, key))
}
