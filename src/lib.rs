#![forbid(unsafe_code)]

//! @acp:module "Block Inspector Library"
//! @acp:summary "Resolve template block markers in rendered HTML and drive an inspection overlay"
//! @acp:domain cli
//! @acp:layer api
//! @acp:stability stable
//!
//! # Block Inspector
//!
//! Server-side templating leaves comment markers such as
//! `<!-- BLOCK NAME: header BLOCK CLASS: Vendor\Module\Block\Header -->`
//! in front of the markup each block produced. This crate reads those
//! markers back out of a rendered page and answers "which blocks and
//! containers produced this element?".
//!
//! ## Features
//!
//! - **Marker parsing**: fixed comment grammar for blocks and containers
//! - **Comment index**: one pass mapping each marker to the element after it
//! - **Hierarchy resolution**: root-first, deduplicated path for any node
//! - **Overlay controller**: Idle/Following/Pinned state machine over a
//!   pluggable rendering [`Surface`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use block_inspector::{Page, TargetQuery, DEFAULT_SIBLING_SCAN_LIMIT};
//!
//! fn main() -> block_inspector::Result<()> {
//!     let page = Page::load("product.html")?;
//!     let target = page.find(&"#logo".parse::<TargetQuery>()?)?;
//!
//!     for marker in &page.resolve(target, DEFAULT_SIBLING_SCAN_LIMIT) {
//!         println!("{} {}", marker.kind, marker.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod config;
pub mod dom;
pub mod error;
pub mod geometry;
pub mod hierarchy;
pub mod index;
pub mod input;
pub mod marker;
pub mod overlay;
pub mod page;
pub mod render;
pub mod scan;
pub mod session;
pub mod surface;

// Re-exports
pub use config::Config;
pub use dom::{Document, NodeId, TargetQuery};
pub use error::{InspectorError, Result};
pub use geometry::{Point, Rect, Size};
pub use hierarchy::{HierarchyPath, HierarchyResolver, DEFAULT_SIBLING_SCAN_LIMIT};
pub use index::{CommentIndex, IndexEntry};
pub use input::{Action, InputEvent, InputRouter, KeyChord, KeyPress, Routed};
pub use marker::{is_opening_marker, parse_marker, MarkerKind, MarkerMetadata};
pub use overlay::{ControllerOptions, OverlayController, OverlayState};
pub use page::Page;
pub use render::{sanitize, TooltipContent};
pub use scan::{PageSummary, ScanReport, Scanner};
pub use session::Session;
pub use surface::{HeadlessSurface, Surface, SurfaceSnapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
