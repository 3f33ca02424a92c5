//! Route table construction and lookup.
//!
//! # Responsibilities
//! - Turn the configured prefix → target map into bindings
//! - Look up the binding for an incoming request
//! - Return matched binding, redirect, or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) prefix scan; longest matching prefix wins
//! - Per-entry problems drop the entry, never the table

use std::borrow::Cow;

use axum::http::{Method, Uri};

use crate::config::RouteConfig;
use crate::routing::binding::{Binding, RouteError, Upstream, UpstreamScheme};
use crate::routing::matcher::{clean_path, decode_path, encode_path};

/// What became of a single configuration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Registered(Binding),
    /// Prefix starts with `#`.
    SkippedComment,
    SkippedInvalid(RouteError),
    /// `https://` target while the HTTPS transport is off.
    SkippedHttpsDisabled,
}

/// Classify one `prefix → target` entry.
pub fn classify(prefix: &str, target: &str, https_enabled: bool) -> RouteOutcome {
    if prefix.starts_with('#') {
        return RouteOutcome::SkippedComment;
    }
    if !prefix.starts_with('/') {
        return RouteOutcome::SkippedInvalid(RouteError::InvalidPrefix(prefix.to_string()));
    }

    let upstream = match Upstream::parse(target) {
        Ok(upstream) => upstream,
        Err(e) => return RouteOutcome::SkippedInvalid(e),
    };

    if upstream.scheme() == UpstreamScheme::Https && !https_enabled {
        return RouteOutcome::SkippedHttpsDisabled;
    }

    RouteOutcome::Registered(Binding::new(prefix, upstream))
}

/// Result of resolving a request against the table.
#[derive(Debug, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    Forward(&'a Binding),
    /// Answer with a permanent redirect to this location.
    Redirect(String),
    NotFound,
    /// Asterisk-form target, or a path that does not decode to UTF-8.
    BadRequest,
}

/// Immutable set of bindings shared by every transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    bindings: Vec<Binding>,
}

impl RouteTable {
    /// Build the table, logging the outcome of every entry.
    pub fn from_config(routes: &RouteConfig, https_enabled: bool) -> Self {
        let mut bindings = Vec::new();

        for (prefix, target) in routes {
            match classify(prefix, target, https_enabled) {
                RouteOutcome::Registered(binding) => {
                    tracing::info!(prefix = %prefix, upstream = %binding.upstream(), "Route registered");
                    bindings.push(binding);
                }
                RouteOutcome::SkippedComment => {
                    tracing::info!(prefix = %prefix, target = %target, "Route commented out, skipping");
                }
                RouteOutcome::SkippedInvalid(e) => {
                    tracing::warn!(prefix = %prefix, target = %target, error = %e, "Invalid route, skipping");
                }
                RouteOutcome::SkippedHttpsDisabled => {
                    tracing::warn!(
                        prefix = %prefix,
                        target = %target,
                        "https scheme detected but the HTTPS server is not enabled, run with --https-enabled"
                    );
                }
            }
        }

        tracing::info!(routes = bindings.len(), "Route table built");
        Self { bindings }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Longest registered prefix matching `path`.
    pub fn lookup(&self, path: &str) -> Option<&Binding> {
        self.bindings
            .iter()
            .filter(|b| b.matches(path))
            .max_by_key(|b| b.prefix().len())
    }

    /// Decide how to answer a request.
    ///
    /// Matching runs on the percent-decoded path. Non-canonical paths are
    /// redirected to their cleaned form (except for `CONNECT`), and `/p` is
    /// redirected to `/p/` when only the latter is registered.
    pub fn resolve(&self, method: &Method, uri: &Uri) -> RouteMatch<'_> {
        let raw = uri.path();
        if raw == "*" {
            return RouteMatch::BadRequest;
        }
        let Ok(path) = decode_path(raw) else {
            return RouteMatch::BadRequest;
        };

        let cleaned = if method == Method::CONNECT {
            Cow::Borrowed(path.as_ref())
        } else {
            clean_path(&path)
        };

        if let Some(location) = self.slash_redirect(&cleaned) {
            return RouteMatch::Redirect(with_query(&encode_path(&location), uri.query()));
        }
        if cleaned.as_ref() != path.as_ref() {
            return RouteMatch::Redirect(with_query(&encode_path(&cleaned), uri.query()));
        }

        match self.lookup(&path) {
            Some(binding) => RouteMatch::Forward(binding),
            None => RouteMatch::NotFound,
        }
    }

    fn slash_redirect(&self, path: &str) -> Option<String> {
        if path.ends_with('/') || self.is_registered(path) {
            return None;
        }
        let with_slash = format!("{path}/");
        self.is_registered(&with_slash).then_some(with_slash)
    }

    fn is_registered(&self, prefix: &str) -> bool {
        self.bindings.iter().any(|b| b.prefix() == prefix)
    }
}

fn with_query(path: &str, query: Option<&str>) -> String {
    match query {
        Some(q) => format!("{path}?{q}"),
        None => path.to_string(),
    }
}
