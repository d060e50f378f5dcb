//! Scroll reveal tracking
//!
//! A [`RevealTracker`] binds one intersection observer to one element and
//! mirrors the element's visibility into its `data-visible` attribute
//! (`"true"` / `"false"`). Styling keys entrance transitions off that
//! attribute, so a visibility change never needs a rebuild of the tracker's
//! owner.
//!
//! Lifecycle is explicit:
//!
//! ```text
//! new(options) -> attach(element) -> mount(host) -> ... -> unmount(host)
//!                                       ^                    |
//!                                       +-- reconfigure -----+
//! ```
//!
//! `mount` without an attached element is a silent no-op. `reconfigure` with
//! new options releases the current observer before acquiring a new one.

use observatory_layout::{
    Document, ElementId, Host, IntersectionEntry, IntersectionObserverInit, LayoutError,
    ObserverId, RootMargin,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Attribute written onto observed elements
pub const VISIBILITY_ATTRIBUTE: &str = "data-visible";

/// Reveal configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealOptions {
    /// Fraction of the element that must be inside the viewport, 0.0..=1.0
    pub threshold: f32,
    /// CSS margin shorthand applied to the viewport
    pub root_margin: String,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            threshold: 0.15,
            root_margin: "0px".to_string(),
        }
    }
}

impl RevealOptions {
    pub fn new(threshold: f32, root_margin: impl Into<String>) -> Self {
        Self {
            threshold,
            root_margin: root_margin.into(),
        }
    }

    /// Default root margin with a custom threshold
    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold,
            ..Default::default()
        }
    }

    /// Validate and convert into an observer configuration
    pub fn observer_init(&self) -> Result<IntersectionObserverInit, LayoutError> {
        let margin = RootMargin::parse(&self.root_margin)?;
        IntersectionObserverInit::with_threshold(self.threshold, margin)
    }
}

/// Mirrors one element's viewport visibility into its `data-visible` flag
#[derive(Debug)]
pub struct RevealTracker {
    options: RevealOptions,
    element: Option<ElementId>,
    observer: Option<ObserverId>,
}

impl RevealTracker {
    pub fn new(options: RevealOptions) -> Self {
        Self {
            options,
            element: None,
            observer: None,
        }
    }

    pub fn options(&self) -> &RevealOptions {
        &self.options
    }

    /// Bind the tracker to an element; takes effect on the next `mount`
    pub fn attach(&mut self, element: ElementId) {
        self.element = Some(element);
    }

    pub fn element(&self) -> Option<ElementId> {
        self.element
    }

    pub fn is_observing(&self) -> bool {
        self.observer.is_some()
    }

    /// Start observing the attached element
    ///
    /// Releases any observer this tracker already holds. Without an attached
    /// (and still mounted) element nothing is observed and `Ok` is returned.
    pub fn mount(&mut self, host: &mut Host) -> Result<(), LayoutError> {
        self.release(host);

        let Some(element) = self.element else {
            trace!("no element attached, reveal tracking skipped");
            return Ok(());
        };

        let init = self.options.observer_init()?;
        let observer = host.create_observer(init, Box::new(write_visibility_flag));
        if !host.observe(observer, element) {
            host.disconnect(observer);
            trace!(?element, "element not mounted, reveal tracking skipped");
            return Ok(());
        }

        debug!(
            ?element,
            threshold = self.options.threshold,
            root_margin = %self.options.root_margin,
            "reveal tracking started"
        );
        self.observer = Some(observer);
        Ok(())
    }

    /// Replace the options, re-creating the observer if one is active
    ///
    /// Invalid options are rejected before the current observer is touched.
    pub fn reconfigure(
        &mut self,
        host: &mut Host,
        options: RevealOptions,
    ) -> Result<(), LayoutError> {
        if options == self.options {
            return Ok(());
        }
        options.observer_init()?;
        self.options = options;

        if self.is_observing() {
            self.mount(host)
        } else {
            Ok(())
        }
    }

    /// Stop observing; no flag write happens after this returns
    pub fn unmount(&mut self, host: &mut Host) {
        self.release(host);
    }

    /// Current flag, `None` before the first delivery or without an element
    pub fn is_visible(&self, host: &Host) -> Option<bool> {
        let element = self.element?;
        match host.attribute(element, VISIBILITY_ATTRIBUTE)? {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    fn release(&mut self, host: &mut Host) {
        if let Some(observer) = self.observer.take() {
            host.disconnect(observer);
            debug!(element = ?self.element, "reveal tracking stopped");
        }
    }
}

impl Drop for RevealTracker {
    fn drop(&mut self) {
        if self.observer.is_some() {
            warn!(element = ?self.element, "reveal tracker dropped while still observing");
        }
    }
}

fn write_visibility_flag(entries: &[IntersectionEntry], document: &mut Document) {
    for entry in entries {
        let flag = if entry.is_intersecting { "true" } else { "false" };
        trace!(target_element = ?entry.target, ratio = entry.intersection_ratio, flag, "reveal");
        if let Err(err) = document.set_attribute(entry.target, VISIBILITY_ATTRIBUTE, flag) {
            trace!(%err, "visibility flag dropped");
        }
    }
}
