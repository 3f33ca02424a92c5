//! Upstream targets and prefix bindings.

use std::fmt;
use std::str::FromStr;

use axum::http::uri::{Authority, Scheme};
use thiserror::Error;
use url::Url;

use crate::routing::matcher::PathPrefixMatcher;

/// Reasons a configuration entry cannot become a binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("path prefix {0:?} must start with '/'")]
    InvalidPrefix(String),

    #[error("invalid upstream url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported upstream scheme {0:?}")]
    UnsupportedScheme(String),

    #[error("upstream url has no host")]
    MissingHost,

    #[error("invalid upstream authority {0:?}")]
    InvalidAuthority(String),
}

/// Transport used to reach an upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamScheme {
    Http,
    Https,
}

impl UpstreamScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamScheme::Http => "http",
            UpstreamScheme::Https => "https",
        }
    }

    pub fn to_uri_scheme(self) -> Scheme {
        match self {
            UpstreamScheme::Http => Scheme::HTTP,
            UpstreamScheme::Https => Scheme::HTTPS,
        }
    }
}

/// Scheme and authority a matched request is forwarded to.
///
/// Only the scheme, host and port of the configured URL are kept; any path,
/// query or credentials on the target are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    scheme: UpstreamScheme,
    authority: Authority,
}

impl Upstream {
    /// Parse an upstream target such as `http://localhost:9000`.
    pub fn parse(target: &str) -> Result<Self, RouteError> {
        let url = Url::parse(target)?;

        let scheme = match url.scheme() {
            "http" => UpstreamScheme::Http,
            "https" => UpstreamScheme::Https,
            other => return Err(RouteError::UnsupportedScheme(other.to_string())),
        };

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or(RouteError::MissingHost)?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority =
            Authority::from_str(&authority).map_err(|_| RouteError::InvalidAuthority(authority))?;

        Ok(Self { scheme, authority })
    }

    pub fn scheme(&self) -> UpstreamScheme {
        self.scheme
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme.as_str(), self.authority)
    }
}

/// A path prefix bound to its upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    matcher: PathPrefixMatcher,
    upstream: Upstream,
}

impl Binding {
    pub fn new(prefix: impl Into<String>, upstream: Upstream) -> Self {
        Self {
            matcher: PathPrefixMatcher::new(prefix),
            upstream,
        }
    }

    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn upstream(&self) -> &Upstream {
        &self.upstream
    }

    /// Returns true if `path` falls under this binding's prefix.
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }
}
