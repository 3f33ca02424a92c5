//! Command-line surface.

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::schema::{ListenerConfig, ProxyConfig, TimeoutConfig, TlsConfig};

/// Path-prefix reverse proxy router.
#[derive(Debug, Clone, Parser)]
#[command(name = "prefix-router", version, long_about = None)]
pub struct Args {
    /// Configuration file, relative to the executable's directory
    #[arg(long, default_value = "config.json")]
    pub conf: PathBuf,

    /// HTTP listen address
    #[arg(long, default_value = ":80")]
    pub http: String,

    /// HTTPS listen address
    #[arg(long, default_value = ":8080")]
    pub https: String,

    /// Enable the HTTPS server and https:// upstreams
    #[arg(long)]
    pub https_enabled: bool,

    /// Explain what is being done
    #[arg(short, long)]
    pub verbose: bool,

    /// TLS certificate, relative to the executable's directory
    #[arg(long, default_value = "server.crt")]
    pub cert: PathBuf,

    /// TLS private key, relative to the executable's directory
    #[arg(long, default_value = "server.key")]
    pub key: PathBuf,
}

impl Args {
    /// Build the runtime configuration, resolving file paths against `base_dir`.
    ///
    /// Absolute paths are kept as given.
    pub fn into_config(self, base_dir: &Path) -> ProxyConfig {
        ProxyConfig {
            config_path: base_dir.join(self.conf),
            listener: ListenerConfig {
                http_address: self.http,
                https_address: self.https,
                https_enabled: self.https_enabled,
            },
            tls: TlsConfig {
                cert_path: base_dir.join(self.cert),
                key_path: base_dir.join(self.key),
            },
            timeouts: TimeoutConfig::default(),
            verbose: self.verbose,
        }
    }
}

/// Directory containing the running executable.
pub fn executable_dir() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "executable has no parent directory",
        )
    })
}
