//! Configuration schema definitions.
//!
//! Two shapes live here: [`ConfigFile`], the JSON document naming the routes,
//! and [`ProxyConfig`], the runtime settings assembled from the command line.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Mapping from path prefix to upstream target URL.
///
/// A `BTreeMap` keeps iteration (and therefore route logging) deterministic.
/// Duplicate keys in the source document resolve last-write-wins.
pub type RouteConfig = BTreeMap<String, String>;

/// The on-disk configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigFile {
    /// Path prefix to upstream URL bindings. Prefixes starting with `#` are
    /// treated as commented out.
    pub routes: RouteConfig,
}

impl ConfigFile {
    /// Parse a configuration document from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

/// Runtime settings for the proxy process.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Location of the JSON routes document.
    pub config_path: PathBuf,

    /// Transport listeners.
    pub listener: ListenerConfig,

    /// Certificate material for the HTTPS transport.
    pub tls: TlsConfig,

    /// Upstream connection timeouts.
    pub timeouts: TimeoutConfig,

    /// Log every forwarded request.
    pub verbose: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("config.json"),
            listener: ListenerConfig::default(),
            tls: TlsConfig::default(),
            timeouts: TimeoutConfig::default(),
            verbose: false,
        }
    }
}

/// Listener configuration for both transports.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// HTTP transport address (`:80`, `127.0.0.1:8000`, ...).
    pub http_address: String,

    /// HTTPS transport address.
    pub https_address: String,

    /// Start the HTTPS transport and accept `https://` upstreams.
    pub https_enabled: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            http_address: ":80".to_string(),
            https_address: ":8080".to_string(),
            https_enabled: false,
        }
    }
}

/// TLS configuration for the HTTPS transport.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: PathBuf,

    /// Path to private key file (PEM).
    pub key_path: PathBuf,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            cert_path: PathBuf::from("server.crt"),
            key_path: PathBuf::from("server.key"),
        }
    }
}

/// Timeout configuration for upstream connections.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { connect_secs: 30 }
    }
}
