//! Navigation shell
//!
//! The shell renders a fixed, ordered list of [`NavRoute`]s and marks the
//! one whose path equals the current path. Highlighting is recomputed from
//! scratch on every render by [`active_index`]; nothing about it is stored.

use std::sync::Arc;

use observatory_core::ReactiveGraph;
use serde::{Deserialize, Serialize};

use crate::router::Router;

/// Lucide icon paths used by the nav links
mod icons {
    /// activity
    pub const ACTIVITY: &str = r#"<path d="M22 12h-2.48a2 2 0 0 0-1.93 1.46l-2.35 8.36a.25.25 0 0 1-.48 0L9.24 2.18a.25.25 0 0 0-.48 0l-2.35 8.36A2 2 0 0 1 4.49 12H2"/>"#;

    /// compass
    pub const COMPASS: &str = r#"<path d="m16.24 7.76-1.804 5.411a2 2 0 0 1-1.265 1.265L7.76 16.24l1.804-5.411a2 2 0 0 1 1.265-1.265z"/><circle cx="12" cy="12" r="10"/>"#;

    /// users round
    pub const USERS_ROUND: &str = r#"<path d="M18 21a8 8 0 0 0-16 0"/><circle cx="10" cy="8" r="5"/><path d="M22 20c0-3.37-2-6.5-4-8a5 5 0 0 0-.45-8.3"/>"#;
}

/// Icon shown next to a nav label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavIcon {
    Compass,
    Activity,
    UsersRound,
}

impl NavIcon {
    /// SVG inner elements (24x24 viewBox)
    pub fn svg_body(&self) -> &'static str {
        match self {
            NavIcon::Compass => icons::COMPASS,
            NavIcon::Activity => icons::ACTIVITY,
            NavIcon::UsersRound => icons::USERS_ROUND,
        }
    }

    /// Complete stroked SVG at the given pixel size
    pub fn to_svg(&self, size: u32) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">{}</svg>"#,
            self.svg_body()
        )
    }
}

/// One entry of the navigation bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavRoute {
    pub path: String,
    pub label: String,
    pub icon: NavIcon,
}

impl NavRoute {
    pub fn new(path: impl Into<String>, label: impl Into<String>, icon: NavIcon) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            icon,
        }
    }
}

/// Index of the route whose path equals `current_path` exactly
///
/// No prefix matching: `/team/leads` does not activate `/team`.
pub fn active_index(current_path: &str, routes: &[NavRoute]) -> Option<usize> {
    routes.iter().position(|route| route.path == current_path)
}

/// Highlight state of a single link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LinkState {
    #[default]
    Inactive,
    Active,
}

impl LinkState {
    /// State of `entry_path` while `current_path` is shown
    pub fn resolve(current_path: &str, entry_path: &str) -> Self {
        if current_path == entry_path {
            LinkState::Active
        } else {
            LinkState::Inactive
        }
    }

    /// Transition on a path change
    pub fn on_path_change(&self, entry_path: &str, new_path: &str) -> Option<Self> {
        let next = Self::resolve(new_path, entry_path);
        (next != *self).then_some(next)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LinkState::Active)
    }
}

/// A rendered nav link
#[derive(Debug, Clone, PartialEq)]
pub struct NavLinkView {
    pub path: String,
    pub label: String,
    pub icon: NavIcon,
    pub state: LinkState,
}

/// Output of one shell render
#[derive(Debug, Clone, PartialEq)]
pub struct ShellView {
    pub brand: String,
    pub links: Vec<NavLinkView>,
}

impl ShellView {
    /// The highlighted link, if any
    pub fn active(&self) -> Option<&NavLinkView> {
        self.links.iter().find(|l| l.state.is_active())
    }
}

/// Header with the brand link and the route links
#[derive(Debug, Clone)]
pub struct NavigationShell {
    brand: String,
    routes: Arc<[NavRoute]>,
}

impl NavigationShell {
    pub fn new(brand: impl Into<String>, routes: impl Into<Arc<[NavRoute]>>) -> Self {
        Self {
            brand: brand.into(),
            routes: routes.into(),
        }
    }

    pub fn routes(&self) -> &[NavRoute] {
        &self.routes
    }

    pub fn active_index(&self, current_path: &str) -> Option<usize> {
        active_index(current_path, &self.routes)
    }

    /// Render every link in configured order
    pub fn render(&self, current_path: &str) -> ShellView {
        let links = self
            .routes
            .iter()
            .map(|route| NavLinkView {
                path: route.path.clone(),
                label: route.label.clone(),
                icon: route.icon,
                state: LinkState::resolve(current_path, &route.path),
            })
            .collect();

        ShellView {
            brand: self.brand.clone(),
            links,
        }
    }

    /// Follow the link at `index`; returns false for an unknown index
    pub fn follow(&self, index: usize, router: &mut Router, graph: &mut ReactiveGraph) -> bool {
        match self.routes.get(index) {
            Some(route) => {
                router.navigate(graph, &route.path);
                true
            }
            None => false,
        }
    }

    /// Follow the brand link (always the root path)
    pub fn follow_brand(&self, router: &mut Router, graph: &mut ReactiveGraph) {
        router.navigate(graph, "/");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes() -> Vec<NavRoute> {
        vec![
            NavRoute::new("/", "Brief", NavIcon::Compass),
            NavRoute::new("/visualization", "Viz", NavIcon::Activity),
            NavRoute::new("/team", "Team", NavIcon::UsersRound),
        ]
    }

    #[test]
    fn test_active_route_scenario() {
        let shell = NavigationShell::new("Observatory", routes());
        let view = shell.render("/visualization");

        assert_eq!(view.active().map(|l| l.label.as_str()), Some("Viz"));
        let states: Vec<_> = view.links.iter().map(|l| l.state).collect();
        assert_eq!(
            states,
            vec![LinkState::Inactive, LinkState::Active, LinkState::Inactive]
        );
    }

    #[test]
    fn test_unknown_path_has_no_active_link() {
        let shell = NavigationShell::new("Observatory", routes());
        let view = shell.render("/unknown");
        assert!(view.active().is_none());
        assert_eq!(shell.active_index("/unknown"), None);
    }

    #[test]
    fn test_exact_match_only() {
        let routes = routes();
        assert_eq!(active_index("/team", &routes), Some(2));
        assert_eq!(active_index("/team/", &routes), None);
        assert_eq!(active_index("/team/leads", &routes), None);
        assert_eq!(active_index("/Team", &routes), None);
        assert_eq!(active_index("", &routes), None);
    }

    #[test]
    fn test_at_most_one_active_for_any_path() {
        let shell = NavigationShell::new("Observatory", routes());
        for path in ["/", "/visualization", "/team", "/unknown", "/vis", ""] {
            let view = shell.render(path);
            let active = view.links.iter().filter(|l| l.state.is_active()).count();
            let expected = usize::from(shell.active_index(path).is_some());
            assert_eq!(active, expected, "path {path:?}");
        }
    }

    #[test]
    fn test_render_keeps_configured_order() {
        let shell = NavigationShell::new("Observatory", routes());
        let labels: Vec<_> = shell
            .render("/")
            .links
            .into_iter()
            .map(|l| l.label)
            .collect();
        assert_eq!(labels, vec!["Brief", "Viz", "Team"]);
    }

    #[test]
    fn test_link_state_transitions() {
        let state = LinkState::resolve("/", "/team");
        assert_eq!(state, LinkState::Inactive);
        assert_eq!(state.on_path_change("/team", "/team"), Some(LinkState::Active));
        assert_eq!(state.on_path_change("/team", "/visualization"), None);
        assert_eq!(
            LinkState::Active.on_path_change("/team", "/"),
            Some(LinkState::Inactive)
        );
    }

    #[test]
    fn test_follow_delegates_to_router() {
        let mut graph = ReactiveGraph::new();
        let mut router = Router::new(&mut graph, "/");
        let shell = NavigationShell::new("Observatory", routes());

        assert!(shell.follow(2, &mut router, &mut graph));
        assert_eq!(router.current_path(), "/team");
        assert!(!shell.follow(7, &mut router, &mut graph));
        assert_eq!(router.current_path(), "/team");

        shell.follow_brand(&mut router, &mut graph);
        assert_eq!(router.current_path(), "/");
    }

    #[test]
    fn test_icon_svg() {
        let svg = NavIcon::Compass.to_svg(16);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="16""#));
        assert!(svg.contains(NavIcon::Compass.svg_body()));
    }
}
