//! Observatory Site Runtime
//!
//! The behaviour layer of the observatory site, running on the headless
//! host from `observatory_layout`:
//!
//! - **Scroll reveal**: sections flip a `data-visible` flag as they cross a
//!   viewport threshold
//! - **Scroll reset**: every route change starts the new page at the top
//! - **Navigation shell**: header links with exact-match active highlighting
//!
//! # Example
//!
//! ```rust
//! use observatory_app::{SiteApp, SiteConfig, SiteError};
//!
//! let mut app = SiteApp::new(SiteConfig::default())?;
//! app.frame()?;
//!
//! app.scroll_by(1200.0);
//! app.frame()?;
//! assert_eq!(app.offset(), (0.0, 1200.0));
//!
//! app.follow(2);
//! app.frame()?;
//! assert_eq!(app.current_path(), "/team");
//! assert_eq!(app.offset(), (0.0, 0.0));
//! assert_eq!(app.render().active().map(|l| l.label.as_str()), Some("Team"));
//! # Ok::<(), SiteError>(())
//! ```

mod app;
mod config;
mod error;
mod nav;
mod page;
mod reveal;
mod router;
mod scroll_reset;


pub use app::{SiteApp, SiteSnapshot};
pub use config::{SiteConfig, SiteMetadata, ViewportConfig, CONFIG_FILE};
pub use error::{Result, SiteError};
pub use nav::{active_index, LinkState, NavIcon, NavLinkView, NavRoute, NavigationShell, ShellView};
pub use page::{MountedPage, PageSpec, SectionSpec, SectionVisibility, HEADER_HEIGHT};
pub use reveal::{RevealOptions, RevealTracker, VISIBILITY_ATTRIBUTE};
pub use router::{Location, Router};
pub use scroll_reset::ScrollToTop;

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::app::{SiteApp, SiteSnapshot};
    pub use crate::config::SiteConfig;
    pub use crate::error::{Result, SiteError};
    pub use crate::nav::{LinkState, NavIcon, NavRoute, NavigationShell};
    pub use crate::page::{PageSpec, SectionSpec};
    pub use crate::reveal::{RevealOptions, RevealTracker};
    pub use crate::router::Router;

    // Host types
    pub use observatory_layout::{Host, ScrollBehavior, Viewport};
}
