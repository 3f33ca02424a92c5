//! Path-prefix reverse proxy router.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 PREFIX ROUTER                 │
//!                        │                                               │
//!     Client Request     │  ┌─────────┐    ┌─────────┐    ┌───────────┐ │
//!     ───────────────────┼─▶│   net   │───▶│  http   │───▶│  routing  │ │
//!                        │  │listener │    │ server  │    │   table   │ │
//!                        │  └─────────┘    └─────────┘    └─────┬─────┘ │
//!                        │                                      │       │
//!     Client Response    │  ┌─────────┐    ┌─────────┐          ▼       │
//!     ◀──────────────────┼──│response │◀───│upstream │◀── forward ──────┼──── Upstream
//!                        │  │ headers │    │ client  │                  │
//!                        │  └─────────┘    └─────────┘                  │
//!                        │                                               │
//!                        │  config · lifecycle · observability           │
//!                        └──────────────────────────────────────────────┘
//! ```
//!
//! The route table is built once from the JSON configuration file before any
//! listener is bound, then shared read-only by the HTTP and HTTPS transports.

use std::process::ExitCode;

use clap::Parser;

use prefix_router::config::{executable_dir, Args};
use prefix_router::lifecycle;
use prefix_router::observability::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    tracing::info!("prefix-router v{} starting", env!("CARGO_PKG_VERSION"));

    let base_dir = match executable_dir() {
        Ok(dir) => dir,
        Err(e) => {
            tracing::error!(error = %e, "Failed to locate executable directory");
            return ExitCode::FAILURE;
        }
    };
    let config = args.into_config(&base_dir);

    tracing::info!(
        config_path = %config.config_path.display(),
        http_address = %config.listener.http_address,
        https_address = %config.listener.https_address,
        https_enabled = config.listener.https_enabled,
        "Configuration resolved"
    );

    match lifecycle::run(&config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}
