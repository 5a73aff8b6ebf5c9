//! Preload/hydration bridge.
//!
//! # Data Flow
//! ```text
//! Server:
//!     store state + sealed preload bag + settings
//!     → payload.rs (HydrationPayload, JSON script, preload markers)
//!     → layout.rs (document head/tail around the rendered content)
//!     → assets.rs (entry script URLs through assets.json)
//!
//! Client:
//!     document.rs (PayloadSource: HtmlDocument or any DOM adapter)
//!     → payload (state snapshot, public path, settings)
//!     → preload map injected into the first Context only
//! ```
//!
//! # Design Decisions
//! - The payload is one JSON element; preload entries are separate
//!   `data-preload` markers so large strings are not double-encoded
//! - Server-only settings are never serialized

pub mod assets;
pub mod document;
pub mod layout;
pub mod payload;

pub use assets::{AssetError, AssetManifest};
pub use document::{HtmlDocument, HydrationError, PayloadSource};
pub use layout::{Document, DocumentLayout, PageMeta};
pub use payload::HydrationPayload;
