//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     RouteConfig (prefix → target)
//!     → table.rs (classify each entry, log outcome)
//!     → binding.rs (parse target into scheme + authority)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (method, path)
//!     → table.rs (canonicalize, redirect if needed)
//!     → matcher.rs (evaluate prefixes)
//!     → Return: Forward(binding), Redirect or NotFound
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always builds the same table
//! - Longest prefix wins

pub mod binding;
pub mod matcher;
pub mod table;

pub use binding::{Binding, RouteError, Upstream, UpstreamScheme};
pub use matcher::PathPrefixMatcher;
pub use table::{classify, RouteMatch, RouteOutcome, RouteTable};
