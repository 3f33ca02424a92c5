//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! listen address (":80", "127.0.0.1:8080")
//!     → listener.rs (normalize, bind)
//!     → tls.rs (HTTPS transport only: load cert + key)
//!     → Hand off to HTTP layer
//!
//! upstream https:// target
//!     → tls.rs (client config, optionally trusting any certificate)
//! ```
//!
//! # Design Decisions
//! - Every listener is bound before any transport serves
//! - TLS is optional and handled transparently

pub mod listener;
pub mod tls;
