//! Upstream HTTP client.
//!
//! One pooled client is shared by every binding. It speaks HTTP/1.1 to both
//! `http://` and `https://` upstreams.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client, Error as ClientError},
    rt::TokioExecutor,
};

use crate::config::ProxyConfig;
use crate::net::tls::{self, TlsError};

/// Client used to forward requests to upstreams.
#[derive(Clone)]
pub struct UpstreamClient {
    inner: Client<HttpsConnector<HttpConnector>, Body>,
}

impl UpstreamClient {
    /// Build the client.
    ///
    /// With the HTTPS transport enabled, upstream certificates are accepted
    /// without verification. Otherwise the webpki roots are trusted; no
    /// `https://` binding exists in that mode anyway.
    pub fn new(config: &ProxyConfig) -> Result<Self, TlsError> {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));

        let builder = if config.listener.https_enabled {
            tracing::warn!("Upstream TLS certificate verification disabled");
            HttpsConnectorBuilder::new().with_tls_config(tls::insecure_client_config()?)
        } else {
            HttpsConnectorBuilder::new().with_provider_and_webpki_roots(tls::crypto_provider())?
        };
        let connector = builder.https_or_http().enable_http1().wrap_connector(http);

        Ok(Self {
            inner: Client::builder(TokioExecutor::new()).build(connector),
        })
    }

    pub async fn request(&self, request: Request<Body>) -> Result<Response<Incoming>, ClientError> {
        self.inner.request(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_with_and_without_https_transport() {
        let mut config = ProxyConfig::default();
        assert!(UpstreamClient::new(&config).is_ok());

        config.listener.https_enabled = true;
        assert!(UpstreamClient::new(&config).is_ok());
    }
}
