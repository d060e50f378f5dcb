//! Scroll-to-top on route change
//!
//! [`ScrollToTop`] installs an effect on the router's pathname signal. Every
//! time the path changes it queues an instant scroll to `(0, 0)` on the
//! viewport's [`ScrollRef`]; the host applies it on the next frame, after the
//! new page has been laid out. The effect runs once on install as well, so
//! a fresh app starts at the top.

use observatory_core::{Effect, ReactiveGraph, Signal};
use observatory_layout::{ScrollBehavior, ScrollRef};
use tracing::debug;

/// Handle to the installed scroll reset effect
#[derive(Debug)]
pub struct ScrollToTop {
    effect: Effect,
}

impl ScrollToTop {
    pub fn install(
        graph: &mut ReactiveGraph,
        pathname: Signal<String>,
        scroll_ref: ScrollRef,
    ) -> Self {
        let effect = graph.create_effect(move |g| {
            let path = g.get(pathname).unwrap_or_default();
            debug!(%path, "route changed, resetting scroll");
            scroll_ref.set_scroll_offset_with_behavior(0.0, 0.0, ScrollBehavior::Auto);
        });
        Self { effect }
    }

    /// Times the reset has been queued (install included)
    pub fn resets(&self, graph: &ReactiveGraph) -> u64 {
        graph.effect_runs(self.effect).unwrap_or(0)
    }

    pub fn uninstall(self, graph: &mut ReactiveGraph) {
        graph.dispose_effect(self.effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Router;
    use observatory_core::Rect;
    use observatory_layout::{Host, Overflow, PendingScroll, Viewport};

    fn tall_host() -> Host {
        let mut host = Host::new(Viewport::new(1280.0, 800.0));
        host.mount_element("page", Rect::new(0.0, 0.0, 1280.0, 6000.0));
        host
    }

    #[test]
    fn test_install_queues_instant_reset() {
        let mut graph = ReactiveGraph::new();
        let router = Router::new(&mut graph, "/");
        let scroll_ref = ScrollRef::new();

        let reset = ScrollToTop::install(&mut graph, router.pathname_signal(), scroll_ref.clone());
        assert_eq!(reset.resets(&graph), 1);
        assert_eq!(
            scroll_ref.take_pending(),
            vec![PendingScroll::ToOffset {
                x: 0.0,
                y: 0.0,
                smooth: false
            }]
        );
    }

    #[test]
    fn test_path_change_resets_offset() {
        let mut graph = ReactiveGraph::new();
        let mut host = tall_host();
        let mut router = Router::new(&mut graph, "/");
        let _reset = ScrollToTop::install(&mut graph, router.pathname_signal(), host.scroll_ref());
        host.run_frame();

        host.viewport_mut()
            .scroll_to(300.0, 1200.0, ScrollBehavior::Auto)
            .unwrap();
        router.navigate(&mut graph, "/team");

        // Not applied until the host runs a frame
        assert_eq!(host.viewport().offset().1, 1200.0);
        let stats = host.run_frame();
        assert_eq!(stats.offset, (0.0, 0.0));
    }

    #[test]
    fn test_same_path_does_not_reset() {
        let mut graph = ReactiveGraph::new();
        let mut host = tall_host();
        let mut router = Router::new(&mut graph, "/");
        let reset = ScrollToTop::install(&mut graph, router.pathname_signal(), host.scroll_ref());
        host.run_frame();

        host.viewport_mut()
            .scroll_to(0.0, 900.0, ScrollBehavior::Auto)
            .unwrap();
        router.navigate(&mut graph, "/?tab=sources");
        router.navigate(&mut graph, "/#submission");
        router.replace(&mut graph, "/");
        host.run_frame();

        assert_eq!(reset.resets(&graph), 1);
        assert_eq!(host.viewport().offset(), (0.0, 900.0));
    }

    #[test]
    fn test_every_navigation_ends_at_origin() {
        let mut graph = ReactiveGraph::new();
        let mut host = tall_host();
        let mut router = Router::new(&mut graph, "/");
        let _reset = ScrollToTop::install(&mut graph, router.pathname_signal(), host.scroll_ref());

        let trail = ["/visualization", "/team", "/", "/unknown", "/team"];
        for (i, path) in trail.iter().enumerate() {
            host.viewport_mut()
                .scroll_to(0.0, 250.0 * (i + 1) as f32, ScrollBehavior::Auto)
                .unwrap();
            router.navigate(&mut graph, path);
            assert_eq!(host.run_frame().offset, (0.0, 0.0), "after {path}");
        }

        host.viewport_mut()
            .scroll_to(0.0, 700.0, ScrollBehavior::Auto)
            .unwrap();
        router.back(&mut graph);
        assert_eq!(host.run_frame().offset, (0.0, 0.0));
    }

    #[test]
    fn test_unscrollable_viewport_is_ignored() {
        let mut graph = ReactiveGraph::new();
        let mut host = Host::new(Viewport::new(800.0, 600.0).with_overflow(Overflow::Hidden));
        let mut router = Router::new(&mut graph, "/");
        let _reset = ScrollToTop::install(&mut graph, router.pathname_signal(), host.scroll_ref());

        router.navigate(&mut graph, "/team");
        let stats = host.run_frame();
        assert_eq!(stats.scroll_commands, 2);
        assert_eq!(stats.scroll_failures, 2);
    }

    #[test]
    fn test_uninstall_stops_resets() {
        let mut graph = ReactiveGraph::new();
        let mut router = Router::new(&mut graph, "/");
        let scroll_ref = ScrollRef::new();
        let reset = ScrollToTop::install(&mut graph, router.pathname_signal(), scroll_ref.clone());
        scroll_ref.take_pending();

        reset.uninstall(&mut graph);
        router.navigate(&mut graph, "/team");
        assert_eq!(scroll_ref.pending_len(), 0);
    }
}
