//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command line
//!     → args.rs (clap parse, resolve paths against executable dir)
//!     → ProxyConfig (runtime settings)
//!
//! config file (JSON)
//!     → loader.rs (read & deserialize)
//!     → ConfigFile { routes: RouteConfig }
//!     → handed to the route table builder
//! ```
//!
//! # Design Decisions
//! - Both values are immutable once built; changes require a restart
//! - The schema is typed: a document without a `routes` object of strings is
//!   rejected at load time rather than at use

pub mod args;
pub mod loader;
pub mod schema;

pub use args::{executable_dir, Args};
pub use loader::{load_config, ConfigError};
pub use schema::{ConfigFile, ListenerConfig, ProxyConfig, RouteConfig, TimeoutConfig, TlsConfig};
