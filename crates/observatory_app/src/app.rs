//! Site application
//!
//! [`SiteApp`] wires the pieces into one runtime:
//!
//! - the [`Router`] publishes the current path
//! - [`ScrollToTop`] queues a scroll reset whenever the path changes
//! - a page effect marks the page dirty; the next [`SiteApp::frame`] swaps the
//!   mounted sections before the host applies scrolls and measures
//! - the [`NavigationShell`] renders the header from the current path

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use observatory_core::{DirtyFlag, Effect, ReactiveGraph, Rect};
use observatory_layout::{ElementId, FrameStats, Host, ScrollBehavior, Viewport};
use tracing::{debug, info};

use crate::config::SiteConfig;
use crate::error::Result;
use crate::nav::{NavigationShell, ShellView};
use crate::page::{MountedPage, SectionVisibility, HEADER_HEIGHT};
use crate::router::Router;
use crate::scroll_reset::ScrollToTop;

/// Observable state after a frame
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSnapshot {
    pub frame: u64,
    pub path: String,
    pub offset: (f32, f32),
    /// Label of the highlighted nav link
    pub active: Option<String>,
    pub sections: Vec<SectionVisibility>,
}

/// The running site
pub struct SiteApp {
    config: SiteConfig,
    graph: ReactiveGraph,
    host: Host,
    router: Router,
    shell: NavigationShell,
    scroll_reset: ScrollToTop,
    page_effect: Effect,
    page_dirty: DirtyFlag,
    header: ElementId,
    page: MountedPage,
}

impl SiteApp {
    /// Start at `/`
    pub fn new(config: SiteConfig) -> Result<Self> {
        Self::with_initial_path(config, "/")
    }

    /// Start at `initial`; the page is mounted immediately, the first
    /// reveal flags arrive with the first frame
    pub fn with_initial_path(config: SiteConfig, initial: &str) -> Result<Self> {
        config.validate()?;

        let mut graph = ReactiveGraph::new();
        let mut host = Host::new(Viewport::new(config.viewport.width, config.viewport.height));
        let header = host.mount_element(
            "header",
            Rect::new(0.0, 0.0, config.viewport.width, HEADER_HEIGHT),
        );

        let router = Router::new(&mut graph, initial);
        let shell = NavigationShell::new(config.site.title.clone(), config.routes.clone());
        let scroll_reset = ScrollToTop::install(&mut graph, router.pathname_signal(), host.scroll_ref());

        let page_dirty: DirtyFlag = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&page_dirty);
        let pathname = router.pathname_signal();
        let page_effect = graph.create_effect(move |g| {
            let _ = g.get(pathname);
            flag.store(true, Ordering::Release);
        });

        // the effect's first run already saw the initial path
        page_dirty.store(false, Ordering::Release);
        let page = MountedPage::mount(
            &mut host,
            router.current_path(),
            config.page(router.current_path()),
            &config.reveal,
        )?;
        let app = Self {
            config,
            graph,
            host,
            router,
            shell,
            scroll_reset,
            page_effect,
            page_dirty,
            header,
            page,
        };

        info!(
            title = %app.config.site.title,
            routes = app.config.routes.len(),
            path = %app.router.current_path(),
            "site started"
        );
        Ok(app)
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn graph(&self) -> &ReactiveGraph {
        &self.graph
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn shell(&self) -> &NavigationShell {
        &self.shell
    }

    pub fn header(&self) -> ElementId {
        self.header
    }

    pub fn page(&self) -> &MountedPage {
        &self.page
    }

    pub fn current_path(&self) -> &str {
        self.router.current_path()
    }

    pub fn offset(&self) -> (f32, f32) {
        self.host.viewport().offset()
    }

    /// Scroll resets queued so far
    pub fn scroll_resets(&self) -> u64 {
        self.scroll_reset.resets(&self.graph)
    }

    /// Path changes seen by the page effect, the initial path included
    pub fn page_mounts(&self) -> u64 {
        self.graph.effect_runs(self.page_effect).unwrap_or(0)
    }

    // =========================================================================
    // Input
    // =========================================================================

    pub fn navigate(&mut self, href: &str) {
        self.router.navigate(&mut self.graph, href);
    }

    pub fn replace(&mut self, href: &str) {
        self.router.replace(&mut self.graph, href);
    }

    pub fn back(&mut self) -> bool {
        self.router.back(&mut self.graph)
    }

    pub fn forward(&mut self) -> bool {
        self.router.forward(&mut self.graph)
    }

    /// Click the nav link at `index`
    pub fn follow(&mut self, index: usize) -> bool {
        self.shell.follow(index, &mut self.router, &mut self.graph)
    }

    /// Click the brand link
    pub fn follow_brand(&mut self) {
        self.shell.follow_brand(&mut self.router, &mut self.graph);
    }

    /// Queue a user scroll, applied on the next frame
    pub fn scroll_by(&self, dy: f32) {
        self.host.scroll_ref().scroll_by(0.0, dy);
    }

    /// Queue a scroll to an absolute offset
    pub fn scroll_to(&self, y: f32, behavior: ScrollBehavior) {
        self.host
            .scroll_ref()
            .set_scroll_offset_with_behavior(0.0, y, behavior);
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Swap the page if the path changed, then run one host frame
    pub fn frame(&mut self) -> Result<FrameStats> {
        self.sync_page()?;
        Ok(self.host.run_frame())
    }

    /// Header for the current path
    pub fn render(&self) -> ShellView {
        self.shell.render(self.router.current_path())
    }

    pub fn visibility(&self) -> Vec<SectionVisibility> {
        self.page.visibility(&self.host)
    }

    pub fn snapshot(&self) -> SiteSnapshot {
        SiteSnapshot {
            frame: self.host.frame(),
            path: self.router.current_path().to_string(),
            offset: self.offset(),
            active: self.render().active().map(|link| link.label.clone()),
            sections: self.visibility(),
        }
    }

    fn sync_page(&mut self) -> Result<()> {
        if !self.page_dirty.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        let path = self.router.current_path().to_string();
        debug!(from = %self.page.path(), to = %path, "swapping page");
        // mount first: the content never collapses, so the offset survives
        // the swap until the queued reset lands
        let next = MountedPage::mount(
            &mut self.host,
            &path,
            self.config.page(&path),
            &self.config.reveal,
        )?;
        let mut previous = std::mem::replace(&mut self.page, next);
        previous.unmount(&mut self.host);
        Ok(())
    }
}

impl Drop for SiteApp {
    fn drop(&mut self) {
        self.page.unmount(&mut self.host);
    }
}

impl std::fmt::Debug for SiteApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteApp")
            .field("path", &self.router.current_path())
            .field("frame", &self.host.frame())
            .field("sections", &self.page.len())
            .finish_non_exhaustive()
    }
}
