//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Raw URL (origin-form or absolute)
//!     → location.rs (strip fragment and basename, split query)
//!     → router.rs (first route whose pattern accepts the pathname)
//!     → matcher.rs (segment matching, param decoding)
//!     → Return: Location + Route, or Unmatched
//!
//! Route compilation:
//!     routes.toml → manifest.rs (loader names → LoaderRegistry)
//!     → RouteTable (flattened, immutable)
//!     → swap.rs (RouteTableHandle, replaced on hot reload)
//! ```
//!
//! # Design Decisions
//! - Tables are immutable; hot reload replaces the whole table
//! - Loaders are registered statically and referenced by name
//! - Deterministic: the same URL always yields the same Location on
//!   server and client

pub mod location;
pub mod manifest;
pub mod matcher;
pub mod router;
pub mod swap;

pub use location::{parse_query, Location, RawUrl};
pub use manifest::{LoaderRegistry, ManifestEntry, ManifestError, RouteManifest};
pub use matcher::{PathPattern, PatternError};
pub use router::{flatten, Route, RouteMatch, RouteNode, RouteTable};
pub use swap::{apply_updates, RouteTableHandle};
