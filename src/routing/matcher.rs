//! Route matching logic.
//!
//! # Responsibilities
//! - Match path prefixes on segment boundaries
//! - Canonicalize request paths before matching
//! - Decode percent-escapes so prefixes compare against the literal path
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `/a` matches `/a` and `/a/x` but not `/ab`; a prefix ending in `/`
//!   matches everything beneath it
//! - No regex to guarantee O(n) matching

use std::borrow::Cow;
use std::str::Utf8Error;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Bytes escaped when a decoded path is written back into a `Location`.
const PATH_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Matches the request path against a configured prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || self.prefix.ends_with('/') || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Canonical form of a request path.
///
/// Collapses repeated slashes, resolves `.` and `..` segments and guarantees a
/// leading `/`. A trailing slash on the input is kept.
pub fn clean_path(path: &str) -> Cow<'_, str> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut cleaned = String::with_capacity(path.len() + 1);
    for segment in &segments {
        cleaned.push('/');
        cleaned.push_str(segment);
    }
    if cleaned.is_empty() || (path.ends_with('/') && !segments.is_empty()) {
        cleaned.push('/');
    }

    if cleaned == path {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(cleaned)
    }
}

/// Percent-decode a request path. Fails when the result is not UTF-8.
pub fn decode_path(raw: &str) -> Result<Cow<'_, str>, Utf8Error> {
    percent_decode_str(raw).decode_utf8()
}

/// Re-escape a decoded path for use in a URI.
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ESCAPE).to_string()
}
