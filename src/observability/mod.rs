//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → request spans (tower-http TraceLayer, tagged with x-request-id)
//!
//! Consumers:
//!     → logging.rs (fmt subscriber on stdout)
//! ```

pub mod logging;

pub use logging::init_logging;
