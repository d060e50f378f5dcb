//! Client-side routing
//!
//! The router owns a history stack and publishes the current location
//! through two signals:
//!
//! - `location` is written on every navigation
//! - `pathname` is written only when the path itself changes
//!
//! Effects that must react to page changes (scroll reset, page remount)
//! depend on `pathname`, so query or hash changes on the same page leave
//! them alone.

use std::fmt;

use observatory_core::{ReactiveGraph, Signal};
use tracing::debug;

/// A parsed in-app URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub pathname: String,
    /// Query string without the leading `?`
    pub search: String,
    /// Fragment without the leading `#`
    pub hash: String,
}

impl Location {
    /// Parse `"/path?query#hash"`; an empty path becomes `/`
    pub fn parse(href: &str) -> Self {
        let (rest, hash) = match href.split_once('#') {
            Some((rest, hash)) => (rest, hash),
            None => (href, ""),
        };
        let (path, search) = match rest.split_once('?') {
            Some((path, search)) => (path, search),
            None => (rest, ""),
        };

        let pathname = if path.is_empty() {
            "/".to_string()
        } else if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        Self {
            pathname,
            search: search.to_string(),
            hash: hash.to_string(),
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::parse("/")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pathname)?;
        if !self.search.is_empty() {
            write!(f, "?{}", self.search)?;
        }
        if !self.hash.is_empty() {
            write!(f, "#{}", self.hash)?;
        }
        Ok(())
    }
}

/// History-backed router
#[derive(Debug)]
pub struct Router {
    history: Vec<Location>,
    index: usize,
    location: Signal<Location>,
    pathname: Signal<String>,
}

impl Router {
    /// Create a router positioned at `initial`
    pub fn new(graph: &mut ReactiveGraph, initial: &str) -> Self {
        let start = Location::parse(initial);
        let pathname = graph.create_signal(start.pathname.clone());
        let location = graph.create_signal(start.clone());
        Self {
            history: vec![start],
            index: 0,
            location,
            pathname,
        }
    }

    /// Signal carrying the full location, written on every navigation
    pub fn location_signal(&self) -> Signal<Location> {
        self.location
    }

    /// Signal carrying the path, written only when it changes
    pub fn pathname_signal(&self) -> Signal<String> {
        self.pathname
    }

    pub fn current(&self) -> &Location {
        &self.history[self.index]
    }

    pub fn current_path(&self) -> &str {
        &self.current().pathname
    }

    /// Push a new entry, discarding any forward history
    pub fn navigate(&mut self, graph: &mut ReactiveGraph, href: &str) {
        let next = Location::parse(href);
        debug!(from = %self.current(), to = %next, "navigate");
        self.history.truncate(self.index + 1);
        self.history.push(next);
        self.index = self.history.len() - 1;
        self.publish(graph);
    }

    /// Replace the current entry
    pub fn replace(&mut self, graph: &mut ReactiveGraph, href: &str) {
        self.history[self.index] = Location::parse(href);
        self.publish(graph);
    }

    /// Go back one entry; returns false at the start of history
    pub fn back(&mut self, graph: &mut ReactiveGraph) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        self.publish(graph);
        true
    }

    /// Go forward one entry; returns false at the end of history
    pub fn forward(&mut self, graph: &mut ReactiveGraph) -> bool {
        if self.index + 1 >= self.history.len() {
            return false;
        }
        self.index += 1;
        self.publish(graph);
        true
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.history.len()
    }

    fn publish(&self, graph: &mut ReactiveGraph) {
        let current = self.current().clone();
        let pathname = current.pathname.clone();
        graph.batch(|g| {
            g.set(self.location, current);
            g.set_if_changed(self.pathname, pathname);
        });
    }
}
