//! Single-host request forwarding.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → rewrite scheme + authority to the binding's upstream (path kept)
//!     → strip hop-by-hop headers, append X-Forwarded-For
//!     → UpstreamClient (HTTP/1.1)
//!     → strip hop-by-hop headers from the response
//!     → stream status, headers and body back
//! ```
//!
//! Upstream failures become `502 Bad Gateway`. Nothing is retried.

use std::net::{IpAddr, SocketAddr};

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, Uri, Version};
use axum::response::Response;

use crate::http::client::UpstreamClient;
use crate::http::response::{self, strip_hop_by_hop};
use crate::routing::{Binding, Upstream};

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Upstream URI for `original`: the upstream's scheme and authority with the
/// original path and query.
pub fn upstream_uri(original: &Uri, upstream: &Upstream) -> Result<Uri, axum::http::Error> {
    let path_and_query = original
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    Uri::builder()
        .scheme(upstream.scheme().to_uri_scheme())
        .authority(upstream.authority().clone())
        .path_and_query(path_and_query)
        .build()
}

/// Append the client address to `X-Forwarded-For`.
pub fn append_forwarded_for(headers: &mut HeaderMap, client_ip: IpAddr) {
    let prior: Vec<&str> = headers
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    let value = if prior.is_empty() {
        client_ip.to_string()
    } else {
        format!("{}, {}", prior.join(", "), client_ip)
    };

    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}

/// Forward `request` to the binding's upstream and return its response.
pub async fn forward(
    client: &UpstreamClient,
    binding: &Binding,
    remote_addr: Option<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let upstream = binding.upstream();
    let (mut parts, body) = request.into_parts();

    let uri = match upstream_uri(&parts.uri, upstream) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(upstream = %upstream, error = %e, "Failed to build upstream uri");
            return response::bad_gateway();
        }
    };

    // HTTP/2 requests carry the host in the URI only.
    if !parts.headers.contains_key(header::HOST) {
        if let Some(value) = parts
            .uri
            .authority()
            .and_then(|a| HeaderValue::from_str(a.as_str()).ok())
        {
            parts.headers.insert(header::HOST, value);
        }
    }

    strip_hop_by_hop(&mut parts.headers, true);
    if let Some(addr) = remote_addr {
        append_forwarded_for(&mut parts.headers, addr.ip());
    }

    parts.uri = uri;
    parts.version = Version::HTTP_11;
    parts.extensions.clear();

    tracing::debug!(prefix = %binding.prefix(), upstream = %upstream, uri = %parts.uri, "Forwarding request");

    match client.request(Request::from_parts(parts, body)).await {
        Ok(upstream_response) => {
            let (mut parts, body) = upstream_response.into_parts();
            strip_hop_by_hop(&mut parts.headers, false);
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(prefix = %binding.prefix(), upstream = %upstream, error = %e, "Upstream request failed");
            response::bad_gateway()
        }
    }
}
