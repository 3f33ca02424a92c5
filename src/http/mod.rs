//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, HTTP and HTTPS transports)
//!     → request.rs (request ID, tracing span)
//!     → routing::RouteTable (prefix lookup)
//!     → forward.rs (rewrite, send through client.rs)
//!     → response.rs (strip hop-by-hop headers, canned errors)
//!     → Send to client
//! ```

pub mod client;
pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use client::UpstreamClient;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
