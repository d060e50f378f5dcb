//! Headless host runtime
//!
//! [`Host`] ties the document, the viewport and the observer registry
//! together and advances them one frame at a time:
//!
//! 1. settle the smooth scroll started last frame
//! 2. apply queued [`ScrollRef`] commands (post-paint, best effort)
//! 3. measure observed elements against the viewport
//! 4. deliver the resulting entries to observer callbacks
//!
//! Nothing observable happens between frames: `observe` never reports
//! synchronously and scroll commands wait for the next frame.

use observatory_core::Rect;
use tracing::debug;

use crate::document::{Document, ElementId, ElementNode};
use crate::intersection::{
    IntersectionCallback, IntersectionObserverInit, IntersectionObserverRegistry, ObserverId,
};
use crate::viewport::{ScrollRef, Viewport};

/// What happened during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub scroll_commands: usize,
    /// Commands the viewport rejected (dropped, never retried)
    pub scroll_failures: usize,
    pub entries_delivered: usize,
    pub offset: (f32, f32),
}

/// Document + viewport + observers, driven frame by frame
pub struct Host {
    document: Document,
    viewport: Viewport,
    observers: IntersectionObserverRegistry,
    scroll_ref: ScrollRef,
    frame: u64,
}

impl Host {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            document: Document::new(),
            viewport,
            observers: IntersectionObserverRegistry::new(),
            scroll_ref: ScrollRef::new(),
            frame: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn observers(&self) -> &IntersectionObserverRegistry {
        &self.observers
    }

    /// Handle for queueing scroll commands applied on the next frame
    pub fn scroll_ref(&self) -> ScrollRef {
        self.scroll_ref.clone()
    }

    /// Frames run so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    // =========================================================================
    // Elements
    // =========================================================================

    /// Mount an element and grow the scrollable content to fit it
    pub fn mount_element(&mut self, key: impl Into<String>, bounds: Rect) -> ElementId {
        let id = self.document.mount(key, bounds);
        self.sync_content_size();
        id
    }

    /// Unmount an element; every observer stops watching it first
    pub fn unmount_element(&mut self, id: ElementId) -> Option<ElementNode> {
        self.observers.unobserve_everywhere(id);
        let node = self.document.unmount(id);
        self.sync_content_size();
        node
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.document.attribute(id, name)
    }

    // =========================================================================
    // Observers
    // =========================================================================

    pub fn create_observer(
        &mut self,
        init: IntersectionObserverInit,
        callback: IntersectionCallback,
    ) -> ObserverId {
        self.observers.create(init, callback)
    }

    /// Watch a mounted element; returns false if either side is gone
    pub fn observe(&mut self, observer: ObserverId, element: ElementId) -> bool {
        self.document.contains(element) && self.observers.observe(observer, element)
    }

    pub fn unobserve(&mut self, observer: ObserverId, element: ElementId) {
        self.observers.unobserve(observer, element);
    }

    pub fn disconnect(&mut self, observer: ObserverId) {
        self.observers.disconnect(observer);
    }

    /// Measure observed elements and queue entries without delivering them
    pub fn collect_intersections(&mut self) -> usize {
        self.observers
            .collect(&self.document, self.viewport.rect(), self.frame)
    }

    /// Deliver every queued entry
    pub fn deliver_intersections(&mut self) -> usize {
        self.observers.deliver(&mut self.document)
    }

    // =========================================================================
    // Frame loop
    // =========================================================================

    /// Advance one frame
    pub fn run_frame(&mut self) -> FrameStats {
        self.frame += 1;
        let mut stats = FrameStats {
            frame: self.frame,
            ..Default::default()
        };

        self.viewport.settle();

        for command in self.scroll_ref.take_pending() {
            stats.scroll_commands += 1;
            if let Err(err) = self.viewport.apply(command) {
                stats.scroll_failures += 1;
                debug!(?command, %err, "scroll command dropped");
            }
        }

        self.collect_intersections();
        stats.entries_delivered = self.deliver_intersections();
        stats.offset = self.viewport.offset();
        stats
    }

    fn sync_content_size(&mut self) {
        let (width, height) = self.document.content_size();
        self.viewport.set_content_size(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intersection::IntersectionEntry;
    use crate::viewport::Overflow;

    fn host() -> Host {
        Host::new(Viewport::new(1000.0, 800.0))
    }

    fn flagging_callback() -> IntersectionCallback {
        Box::new(|entries: &[IntersectionEntry], doc: &mut Document| {
            for entry in entries {
                let value = if entry.is_intersecting { "yes" } else { "no" };
                let _ = doc.set_attribute(entry.target, "seen", value);
            }
        })
    }

    #[test]
    fn test_mount_grows_content() {
        let mut host = host();
        host.mount_element("tall", Rect::new(0.0, 0.0, 1000.0, 3000.0));
        assert_eq!(host.viewport().max_scroll(), (0.0, 2200.0));
    }

    #[test]
    fn test_frame_applies_scroll_before_measuring() {
        let mut host = host();
        host.mount_element("spacer", Rect::new(0.0, 0.0, 1000.0, 2000.0));
        let below = host.mount_element("below", Rect::new(0.0, 2000.0, 1000.0, 400.0));

        let observer = host.create_observer(Default::default(), flagging_callback());
        assert!(host.observe(observer, below));

        host.run_frame();
        assert_eq!(host.attribute(below, "seen"), Some("no"));

        host.scroll_ref().set_scroll_offset(0.0, 1600.0);
        let stats = host.run_frame();
        assert_eq!(stats.scroll_commands, 1);
        assert_eq!(stats.offset, (0.0, 1600.0));
        assert_eq!(stats.entries_delivered, 1);
        assert_eq!(host.attribute(below, "seen"), Some("yes"));
    }

    #[test]
    fn test_unmount_stops_observation() {
        let mut host = host();
        let el = host.mount_element("el", Rect::new(0.0, 0.0, 100.0, 100.0));
        let observer = host.create_observer(Default::default(), flagging_callback());
        host.observe(observer, el);

        host.collect_intersections();
        host.unmount_element(el);
        assert_eq!(host.deliver_intersections(), 0);
        assert!(!host.observe(observer, el));
    }

    #[test]
    fn test_rejected_scroll_is_dropped() {
        let mut host = Host::new(Viewport::new(800.0, 600.0).with_overflow(Overflow::Hidden));
        host.scroll_ref().set_scroll_offset(0.0, 0.0);

        let stats = host.run_frame();
        assert_eq!(stats.scroll_failures, 1);
        assert_eq!(host.scroll_ref().pending_len(), 0);
    }
}
