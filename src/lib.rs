//! Path-prefix reverse proxy router.
//!
//! Reads a static `prefix → upstream` map at startup and forwards each
//! request to the upstream bound to its longest matching prefix, over HTTP
//! or HTTPS.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::{ConfigFile, ProxyConfig};
pub use http::HttpServer;
pub use lifecycle::{Proxy, Shutdown};
pub use routing::RouteTable;
