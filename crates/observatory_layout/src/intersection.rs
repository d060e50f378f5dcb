//! Intersection observation
//!
//! An observer watches a set of elements against the viewport (expanded by
//! its root margin) and reports an [`IntersectionEntry`] whenever an
//! element's threshold index or intersecting state changes. The first
//! measurement after `observe` is always reported, so an element that is
//! already on screen produces an initial "intersecting" entry without any
//! scrolling.
//!
//! Observation is split into two phases driven by the host frame loop:
//!
//! 1. [`IntersectionObserverRegistry::collect`] measures every observed
//!    element and queues entries
//! 2. [`IntersectionObserverRegistry::deliver`] hands queued entries to the
//!    callbacks in queue order
//!
//! Disconnecting an observer or unobserving a target between the two phases
//! drops its queued entries; a callback never sees an element its observer
//! has stopped watching.

use std::collections::VecDeque;

use observatory_core::Rect;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::document::{Document, ElementId};
use crate::error::{LayoutError, Result};
use crate::root_margin::RootMargin;

new_key_type! {
    /// Identity of a registered observer
    pub struct ObserverId;
}

/// Observer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionObserverInit {
    /// Sorted, deduplicated, never empty
    thresholds: SmallVec<[f32; 4]>,
    root_margin: RootMargin,
}

impl Default for IntersectionObserverInit {
    fn default() -> Self {
        Self {
            thresholds: SmallVec::from_slice(&[0.0]),
            root_margin: RootMargin::ZERO,
        }
    }
}

impl IntersectionObserverInit {
    /// Build a configuration; an empty threshold list means `[0.0]`
    pub fn new(thresholds: &[f32], root_margin: RootMargin) -> Result<Self> {
        let mut sorted: SmallVec<[f32; 4]> = SmallVec::with_capacity(thresholds.len());
        for &threshold in thresholds {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(LayoutError::InvalidThreshold(threshold));
            }
            sorted.push(threshold);
        }
        if sorted.is_empty() {
            sorted.push(0.0);
        }
        sorted.sort_by(f32::total_cmp);
        sorted.dedup();

        Ok(Self {
            thresholds: sorted,
            root_margin,
        })
    }

    /// Single-threshold configuration
    pub fn with_threshold(threshold: f32, root_margin: RootMargin) -> Result<Self> {
        Self::new(&[threshold], root_margin)
    }

    pub fn thresholds(&self) -> &[f32] {
        &self.thresholds
    }

    pub fn root_margin(&self) -> RootMargin {
        self.root_margin
    }
}

/// One observed change
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub target: ElementId,
    pub is_intersecting: bool,
    /// Visible fraction of the target's area, 0.0..=1.0
    pub intersection_ratio: f32,
    /// Target bounds in document coordinates
    pub bounding_rect: Rect,
    pub intersection_rect: Rect,
    /// Viewport rectangle after the root margin was applied
    pub root_bounds: Rect,
    /// Frame the measurement was taken in
    pub frame: u64,
}

/// Observer callback; receives the document so it can write attributes
pub type IntersectionCallback = Box<dyn FnMut(&[IntersectionEntry], &mut Document) + Send>;

/// Result of measuring one target against the root
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub ratio: f32,
    pub is_intersecting: bool,
    pub threshold_index: usize,
    pub intersection_rect: Rect,
}

/// Measure a target against root bounds
///
/// `thresholds` must be sorted ascending and non-empty. A target counts as
/// intersecting when it touches the root and its ratio reaches the lowest
/// threshold.
pub fn measure(target: Rect, root: Rect, thresholds: &[f32]) -> Measurement {
    let hit = target.intersection(&root);
    let target_area = target.area();

    let ratio = match hit {
        Some(rect) if target_area > 0.0 => (rect.area() / target_area).clamp(0.0, 1.0),
        Some(_) => 1.0,
        None => 0.0,
    };
    let threshold_index = thresholds.iter().take_while(|t| **t <= ratio).count();

    Measurement {
        ratio,
        is_intersecting: hit.is_some() && threshold_index > 0,
        threshold_index,
        intersection_rect: hit.unwrap_or_default(),
    }
}

struct ObservedTarget {
    element: ElementId,
    /// (threshold index, intersecting) from the last reported measurement
    previous: Option<(usize, bool)>,
}

struct ObserverNode {
    init: IntersectionObserverInit,
    callback: IntersectionCallback,
    targets: SmallVec<[ObservedTarget; 1]>,
}

struct QueuedRecords {
    observer: ObserverId,
    entries: SmallVec<[IntersectionEntry; 1]>,
}

/// Every live observer plus the queue of undelivered entries
#[derive(Default)]
pub struct IntersectionObserverRegistry {
    observers: SlotMap<ObserverId, ObserverNode>,
    queue: VecDeque<QueuedRecords>,
}

impl IntersectionObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer; it watches nothing until [`observe`](Self::observe)
    pub fn create(
        &mut self,
        init: IntersectionObserverInit,
        callback: IntersectionCallback,
    ) -> ObserverId {
        let id = self.observers.insert(ObserverNode {
            init,
            callback,
            targets: SmallVec::new(),
        });
        debug!(?id, "observer created");
        id
    }

    /// Start watching an element; returns false for a disconnected observer
    pub fn observe(&mut self, observer: ObserverId, element: ElementId) -> bool {
        let Some(node) = self.observers.get_mut(observer) else {
            return false;
        };
        if !node.targets.iter().any(|t| t.element == element) {
            node.targets.push(ObservedTarget {
                element,
                previous: None,
            });
        }
        true
    }

    /// Stop watching an element and drop its queued entries
    pub fn unobserve(&mut self, observer: ObserverId, element: ElementId) {
        if let Some(node) = self.observers.get_mut(observer) {
            node.targets.retain(|t| t.element != element);
        }
        for records in self.queue.iter_mut().filter(|r| r.observer == observer) {
            records.entries.retain(|e| e.target != element);
        }
    }

    /// Stop watching an element in every observer
    pub fn unobserve_everywhere(&mut self, element: ElementId) {
        for node in self.observers.values_mut() {
            node.targets.retain(|t| t.element != element);
        }
        for records in self.queue.iter_mut() {
            records.entries.retain(|e| e.target != element);
        }
    }

    /// Remove an observer and everything it has queued
    pub fn disconnect(&mut self, observer: ObserverId) {
        if self.observers.remove(observer).is_some() {
            debug!(?observer, "observer disconnected");
        }
        self.queue.retain(|r| r.observer != observer);
    }

    pub fn is_connected(&self, observer: ObserverId) -> bool {
        self.observers.contains_key(observer)
    }

    /// Number of live observers
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Number of undelivered entries
    pub fn queued(&self) -> usize {
        self.queue.iter().map(|r| r.entries.len()).sum()
    }

    /// Measure every observed element against `root` and queue changes
    ///
    /// Returns the number of entries queued.
    pub fn collect(&mut self, document: &Document, root: Rect, frame: u64) -> usize {
        let mut queued = 0;

        for (id, node) in self.observers.iter_mut() {
            let root_bounds = node.init.root_margin.apply(root);
            let mut entries: SmallVec<[IntersectionEntry; 1]> = SmallVec::new();

            for target in node.targets.iter_mut() {
                let Some(bounds) = document.bounds(target.element) else {
                    continue;
                };
                let m = measure(bounds, root_bounds, &node.init.thresholds);
                let state = (m.threshold_index, m.is_intersecting);
                if target.previous == Some(state) {
                    continue;
                }
                target.previous = Some(state);
                entries.push(IntersectionEntry {
                    target: target.element,
                    is_intersecting: m.is_intersecting,
                    intersection_ratio: m.ratio,
                    bounding_rect: bounds,
                    intersection_rect: m.intersection_rect,
                    root_bounds,
                    frame,
                });
            }

            if !entries.is_empty() {
                queued += entries.len();
                self.queue.push_back(QueuedRecords {
                    observer: id,
                    entries,
                });
            }
        }

        queued
    }

    /// Deliver queued entries in order; returns the number delivered
    pub fn deliver(&mut self, document: &mut Document) -> usize {
        let mut delivered = 0;

        while let Some(records) = self.queue.pop_front() {
            let Some(node) = self.observers.get_mut(records.observer) else {
                continue;
            };
            let entries: SmallVec<[IntersectionEntry; 1]> = records
                .entries
                .into_iter()
                .filter(|e| node.targets.iter().any(|t| t.element == e.target))
                .collect();
            if entries.is_empty() {
                continue;
            }
            trace!(observer = ?records.observer, count = entries.len(), "delivering entries");
            delivered += entries.len();
            (node.callback)(&entries[..], &mut *document);
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const VIEWPORT: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 1000.0,
        height: 800.0,
    };

    type Log = Arc<Mutex<Vec<(ElementId, bool)>>>;

    fn recording_observer(
        registry: &mut IntersectionObserverRegistry,
        init: IntersectionObserverInit,
    ) -> (ObserverId, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let id = registry.create(
            init,
            Box::new(move |entries: &[IntersectionEntry], _doc: &mut Document| {
                let mut sink = sink.lock().unwrap();
                sink.extend(entries.iter().map(|e| (e.target, e.is_intersecting)));
            }),
        );
        (id, log)
    }

    #[test]
    fn test_measure_ratio_and_threshold() {
        let target = Rect::new(0.0, 700.0, 1000.0, 500.0);
        let m = measure(target, VIEWPORT, &[0.15]);
        assert!((m.ratio - 0.2).abs() < 1e-6);
        assert!(m.is_intersecting);

        let m = measure(target, VIEWPORT, &[0.25]);
        assert!(!m.is_intersecting);
        assert_eq!(m.threshold_index, 0);
    }

    #[test]
    fn test_measure_edge_adjacent_and_zero_area() {
        let touching = Rect::new(0.0, 800.0, 1000.0, 100.0);
        let m = measure(touching, VIEWPORT, &[0.0]);
        assert_eq!(m.ratio, 0.0);
        assert!(m.is_intersecting);

        let point = Rect::new(10.0, 10.0, 0.0, 0.0);
        assert_eq!(measure(point, VIEWPORT, &[0.5]).ratio, 1.0);

        let outside = Rect::new(10.0, 900.0, 0.0, 0.0);
        assert!(!measure(outside, VIEWPORT, &[0.0]).is_intersecting);
    }

    #[test]
    fn test_init_validation() {
        assert_eq!(
            IntersectionObserverInit::with_threshold(1.5, RootMargin::ZERO),
            Err(LayoutError::InvalidThreshold(1.5))
        );
        assert!(IntersectionObserverInit::with_threshold(f32::NAN, RootMargin::ZERO).is_err());

        let init = IntersectionObserverInit::new(&[0.5, 0.0, 0.5], RootMargin::ZERO).unwrap();
        assert_eq!(init.thresholds(), &[0.0, 0.5]);
        assert_eq!(
            IntersectionObserverInit::new(&[], RootMargin::ZERO)
                .unwrap()
                .thresholds(),
            &[0.0]
        );
    }

    #[test]
    fn test_initial_entry_is_always_reported() {
        let mut doc = Document::new();
        let visible = doc.mount("visible", Rect::new(0.0, 0.0, 1000.0, 400.0));
        let hidden = doc.mount("hidden", Rect::new(0.0, 2000.0, 1000.0, 400.0));

        let mut registry = IntersectionObserverRegistry::new();
        let (observer, log) = recording_observer(&mut registry, Default::default());
        registry.observe(observer, visible);
        registry.observe(observer, hidden);

        assert_eq!(registry.collect(&doc, VIEWPORT, 1), 2);
        assert_eq!(registry.deliver(&mut doc), 2);
        assert_eq!(*log.lock().unwrap(), vec![(visible, true), (hidden, false)]);

        // Nothing changed: nothing reported
        assert_eq!(registry.collect(&doc, VIEWPORT, 2), 0);
    }

    #[test]
    fn test_observe_never_delivers_synchronously() {
        let mut doc = Document::new();
        let el = doc.mount("el", Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut registry = IntersectionObserverRegistry::new();
        let (observer, log) = recording_observer(&mut registry, Default::default());

        registry.observe(observer, el);
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(registry.queued(), 0);
    }

    #[test]
    fn test_disconnect_drops_queued_entries() {
        let mut doc = Document::new();
        let el = doc.mount("el", Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut registry = IntersectionObserverRegistry::new();
        let (observer, log) = recording_observer(&mut registry, Default::default());
        registry.observe(observer, el);

        registry.collect(&doc, VIEWPORT, 1);
        assert_eq!(registry.queued(), 1);

        registry.disconnect(observer);
        assert_eq!(registry.queued(), 0);
        assert_eq!(registry.deliver(&mut doc), 0);
        assert!(log.lock().unwrap().is_empty());
        assert!(!registry.observe(observer, el));
    }

    #[test]
    fn test_unobserve_drops_only_that_target() {
        let mut doc = Document::new();
        let a = doc.mount("a", Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = doc.mount("b", Rect::new(0.0, 100.0, 100.0, 100.0));
        let mut registry = IntersectionObserverRegistry::new();
        let (observer, log) = recording_observer(&mut registry, Default::default());
        registry.observe(observer, a);
        registry.observe(observer, b);

        registry.collect(&doc, VIEWPORT, 1);
        registry.unobserve(observer, a);
        registry.deliver(&mut doc);

        assert_eq!(*log.lock().unwrap(), vec![(b, true)]);
    }

    #[test]
    fn test_root_margin_triggers_early() {
        let mut doc = Document::new();
        let below = doc.mount("below", Rect::new(0.0, 850.0, 1000.0, 100.0));
        let mut registry = IntersectionObserverRegistry::new();

        let (plain, plain_log) = recording_observer(&mut registry, Default::default());
        let grown = IntersectionObserverInit::new(&[0.0], RootMargin::parse("100px").unwrap()).unwrap();
        let (early, early_log) = recording_observer(&mut registry, grown);
        registry.observe(plain, below);
        registry.observe(early, below);

        registry.collect(&doc, VIEWPORT, 1);
        registry.deliver(&mut doc);

        assert_eq!(*plain_log.lock().unwrap(), vec![(below, false)]);
        assert_eq!(*early_log.lock().unwrap(), vec![(below, true)]);
    }

    #[test]
    fn test_multiple_thresholds_report_each_crossing() {
        let mut doc = Document::new();
        let el = doc.mount("el", Rect::new(0.0, 0.0, 1000.0, 1000.0));
        let mut registry = IntersectionObserverRegistry::new();
        let init = IntersectionObserverInit::new(&[0.25, 0.5, 0.75], RootMargin::ZERO).unwrap();
        let (observer, log) = recording_observer(&mut registry, init);
        registry.observe(observer, el);

        // 80% visible, then 60%: still intersecting but a threshold was crossed
        registry.collect(&doc, VIEWPORT, 1);
        registry.collect(&doc, VIEWPORT.translate(0.0, 400.0), 2);
        registry.deliver(&mut doc);

        assert_eq!(*log.lock().unwrap(), vec![(el, true), (el, true)]);
    }
}
