//! TCP listener binding.
//!
//! # Responsibilities
//! - Accept `:port` shorthand as well as `host:port`
//! - Bind before any transport starts serving
//! - Report bind failures with the offending address

use thiserror::Error;
use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Expand the `:port` shorthand to all IPv4 interfaces.
pub fn normalize_address(address: &str) -> String {
    if address.starts_with(':') {
        format!("0.0.0.0{address}")
    } else {
        address.to_string()
    }
}

/// Bind a listener on `address`.
pub async fn bind(address: &str) -> Result<TcpListener, ListenerError> {
    let normalized = normalize_address(address);
    let listener = TcpListener::bind(normalized.as_str())
        .await
        .map_err(|source| ListenerError::Bind {
            address: address.to_string(),
            source,
        })?;

    if let Ok(local_addr) = listener.local_addr() {
        tracing::debug!(address = %local_addr, "Listener bound");
    }
    Ok(listener)
}
