//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;

use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::{Json, Router};
use axum_server::tls_rustls::RustlsConfig;
use prefix_router::config::{ProxyConfig, TlsConfig};
use prefix_router::net::tls::install_crypto_provider;
use prefix_router::{Proxy, Shutdown};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Upstream that answers every request with a JSON description of it.
fn echo_app(name: &'static str) -> Router {
    Router::new().fallback(
        move |method: Method, uri: Uri, headers: HeaderMap, body: String| async move {
            let header = |n: &str| headers.get(n).and_then(|v| v.to_str().ok()).map(str::to_owned);
            (
                StatusCode::OK,
                [("x-backend", name)],
                Json(json!({
                    "backend": name,
                    "method": method.as_str(),
                    "uri": uri.to_string(),
                    "host": header("host"),
                    "x_forwarded_for": header("x-forwarded-for"),
                    "x_request_id": header("x-request-id"),
                    "body": body,
                })),
            )
        },
    )
}

/// Start a plain HTTP echo upstream on an ephemeral port.
pub async fn start_echo_backend(name: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, echo_app(name)).await.unwrap();
    });
    addr
}

/// Start an HTTPS echo upstream with a freshly generated self-signed certificate.
pub async fn start_tls_echo_backend(name: &'static str) -> SocketAddr {
    install_crypto_provider();
    let (cert, key) = self_signed_pem();
    let tls = RustlsConfig::from_pem(cert.into_bytes(), key.into_bytes())
        .await
        .unwrap();

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum_server::from_tcp_rustls(listener, tls)
            .serve(echo_app(name).into_make_service())
            .await
            .unwrap();
    });
    addr
}

/// An address nothing listens on.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// PEM certificate and key for `localhost`.
pub fn self_signed_pem() -> (String, String) {
    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    (cert.pem(), key_pair.serialize_pem())
}

/// Write `server.crt` / `server.key` into `dir`.
pub fn write_tls_material(dir: &Path) -> TlsConfig {
    let (cert, key) = self_signed_pem();
    let tls = TlsConfig {
        cert_path: dir.join("server.crt"),
        key_path: dir.join("server.key"),
    };
    std::fs::write(&tls.cert_path, cert).unwrap();
    std::fs::write(&tls.key_path, key).unwrap();
    tls
}

/// Proxy config listening on ephemeral loopback ports, reading routes from `dir`.
pub fn proxy_config(dir: &Path, routes: &[(&str, String)], https_enabled: bool) -> ProxyConfig {
    let routes: serde_json::Map<String, Value> = routes
        .iter()
        .map(|(prefix, target)| (prefix.to_string(), Value::String(target.clone())))
        .collect();
    let config_path = dir.join("config.json");
    std::fs::write(&config_path, json!({ "routes": routes }).to_string()).unwrap();

    let mut config = ProxyConfig::default();
    config.config_path = config_path;
    config.listener.http_address = "127.0.0.1:0".into();
    config.listener.https_address = "127.0.0.1:0".into();
    config.listener.https_enabled = https_enabled;
    if https_enabled {
        config.tls = write_tls_material(dir);
    }
    config
}

/// A running proxy; shuts down when dropped.
pub struct TestProxy {
    pub http: SocketAddr,
    pub https: Option<SocketAddr>,
    shutdown: Shutdown,
    _dir: TempDir,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.http, path)
    }

    pub fn https_url(&self, path: &str) -> String {
        let addr = self.https.expect("https transport not enabled");
        format!("https://{}{}", addr, path)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a proxy serving `routes`.
pub async fn start_proxy(routes: &[(&str, String)], https_enabled: bool) -> TestProxy {
    let dir = tempfile::tempdir().unwrap();
    let config = proxy_config(dir.path(), routes, https_enabled);

    let proxy = Proxy::bind(&config).await.unwrap();
    let http = proxy.http_addr().unwrap();
    let https = proxy.https_addr().map(|addr| addr.unwrap());

    let shutdown = Shutdown::new();
    let serving = shutdown.clone();
    tokio::spawn(async move {
        let _ = proxy.serve(&serving).await;
    });

    TestProxy {
        http,
        https,
        shutdown,
        _dir: dir,
    }
}

/// Test client: no system proxy, no redirects, any certificate.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .danger_accept_invalid_certs(true)
        .build()
        .unwrap()
}
