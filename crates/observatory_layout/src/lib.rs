//! Observatory headless host
//!
//! A deterministic stand-in for the browser surface the site runs against:
//!
//! - `Document` - mounted elements with bounds and attributes
//! - `Viewport` / `ScrollRef` - scroll offset and deferred scroll commands
//! - `RootMargin` - CSS margin shorthand for growing/shrinking the viewport
//! - `IntersectionObserverRegistry` - threshold-based visibility reporting
//! - `Host` - frame loop tying the pieces together
//!
//! # Example
//!
//! ```rust
//! use observatory_core::Rect;
//! use observatory_layout::{Document, Host, IntersectionEntry, Viewport};
//!
//! let mut host = Host::new(Viewport::new(1280.0, 800.0));
//! let hero = host.mount_element("hero", Rect::new(0.0, 0.0, 1280.0, 600.0));
//!
//! let observer = host.create_observer(
//!     Default::default(),
//!     Box::new(|entries: &[IntersectionEntry], doc: &mut Document| {
//!         for entry in entries {
//!             let flag = if entry.is_intersecting { "true" } else { "false" };
//!             let _ = doc.set_attribute(entry.target, "data-visible", flag);
//!         }
//!     }),
//! );
//! host.observe(observer, hero);
//! host.run_frame();
//!
//! assert_eq!(host.attribute(hero, "data-visible"), Some("true"));
//! ```

pub mod document;
pub mod error;
pub mod host;
pub mod intersection;
pub mod root_margin;
pub mod viewport;

pub use document::{Document, ElementId, ElementNode};
pub use error::{LayoutError, Result};
pub use host::{FrameStats, Host};
pub use intersection::{
    measure, IntersectionCallback, IntersectionEntry, IntersectionObserverInit,
    IntersectionObserverRegistry, Measurement, ObserverId,
};
pub use root_margin::{MarginLength, RootMargin};
pub use viewport::{Overflow, PendingScroll, ScrollBehavior, ScrollRef, Viewport};
