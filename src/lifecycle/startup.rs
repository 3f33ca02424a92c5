//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the routes document and build the route table
//! - Build the upstream client
//! - Load TLS material and bind listeners
//! - Run both transports until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Every listener is bound before any transport serves
//! - A transport failing while serving stops the whole process

use std::net::SocketAddr;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{load_config, ConfigError, ProxyConfig};
use crate::http::{HttpServer, UpstreamClient};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals;
use crate::net::listener::{self, ListenerError};
use crate::net::tls::{self, TlsError};
use crate::routing::RouteTable;

/// Fatal errors; the process exits non-zero on any of them.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("transport failed: {0}")]
    Transport(#[source] std::io::Error),
}

struct HttpsTransport {
    listener: std::net::TcpListener,
    tls: RustlsConfig,
}

/// A fully initialized proxy with its listeners bound.
pub struct Proxy {
    server: HttpServer,
    http_listener: TcpListener,
    https: Option<HttpsTransport>,
}

impl Proxy {
    /// Load the configuration file and bind every transport.
    pub async fn bind(config: &ProxyConfig) -> Result<Self, StartupError> {
        let file = load_config(&config.config_path)?;
        let routes = RouteTable::from_config(&file.routes, config.listener.https_enabled);
        Self::bind_with_routes(config, Arc::new(routes)).await
    }

    /// Bind every transport around an already built route table.
    pub async fn bind_with_routes(
        config: &ProxyConfig,
        routes: Arc<RouteTable>,
    ) -> Result<Self, StartupError> {
        tls::install_crypto_provider();

        let client = UpstreamClient::new(config)?;
        let server = HttpServer::new(routes, client, config.verbose);

        let https = if config.listener.https_enabled {
            let tls = tls::load_tls_config(&config.tls.cert_path, &config.tls.key_path).await?;
            let address = &config.listener.https_address;
            let listener = listener::bind(address)
                .await?
                .into_std()
                .map_err(|source| ListenerError::Bind {
                    address: address.clone(),
                    source,
                })?;
            Some(HttpsTransport { listener, tls })
        } else {
            None
        };

        let http_listener = listener::bind(&config.listener.http_address).await?;

        Ok(Self {
            server,
            http_listener,
            https,
        })
    }

    pub fn http_addr(&self) -> std::io::Result<SocketAddr> {
        self.http_listener.local_addr()
    }

    pub fn https_addr(&self) -> Option<std::io::Result<SocketAddr>> {
        self.https.as_ref().map(|https| https.listener.local_addr())
    }

    /// Serve until `shutdown` fires or a transport fails.
    pub async fn serve(self, shutdown: &Shutdown) -> Result<(), StartupError> {
        let http = self
            .server
            .clone()
            .run(self.http_listener, shutdown.subscribe());

        match self.https {
            Some(https) => {
                let tls = self
                    .server
                    .run_tls(https.listener, https.tls, shutdown.subscribe());
                tokio::try_join!(http, tls)
                    .map(|_| ())
                    .map_err(StartupError::Transport)
            }
            None => http.await.map_err(StartupError::Transport),
        }
    }
}

/// Start the proxy and serve until a termination signal arrives.
pub async fn run(config: &ProxyConfig) -> Result<(), StartupError> {
    let proxy = Proxy::bind(config).await?;

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::terminate().await;
        trigger.trigger();
    });

    proxy.serve(&shutdown).await
}
