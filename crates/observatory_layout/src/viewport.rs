//! Viewport scrolling and deferred scroll commands
//!
//! The [`Viewport`] is the visible window onto the document. Code outside the
//! frame loop never scrolls it directly; it queues a [`PendingScroll`] on a
//! [`ScrollRef`] and the host applies the command during the next frame,
//! after layout has been committed.

use std::sync::{Arc, Mutex};

use observatory_core::Rect;
use tracing::trace;

use crate::error::{LayoutError, Result};

/// Scroll animation behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    /// Instant scroll (no animation)
    #[default]
    Auto,
    /// Animated scroll, settled on the following frame
    Smooth,
}

/// Whether the viewport accepts scroll commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Scroll,
    Hidden,
}

/// The scrollable window onto the document
#[derive(Debug, Clone)]
pub struct Viewport {
    width: f32,
    height: f32,
    scroll_x: f32,
    scroll_y: f32,
    content_width: f32,
    content_height: f32,
    overflow: Overflow,
    /// Target of an in-flight smooth scroll
    smooth_target: Option<(f32, f32)>,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
            content_width: width,
            content_height: height,
            overflow: Overflow::Scroll,
            smooth_target: None,
        }
    }

    pub fn with_overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn offset(&self) -> (f32, f32) {
        (self.scroll_x, self.scroll_y)
    }

    pub fn overflow(&self) -> Overflow {
        self.overflow
    }

    /// Visible region in document coordinates
    pub fn rect(&self) -> Rect {
        Rect::new(self.scroll_x, self.scroll_y, self.width, self.height)
    }

    /// Update the scrollable content extent (never smaller than the viewport)
    pub fn set_content_size(&mut self, width: f32, height: f32) {
        self.content_width = width.max(self.width);
        self.content_height = height.max(self.height);
        self.clamp_offset();
    }

    pub fn max_scroll(&self) -> (f32, f32) {
        (
            (self.content_width - self.width).max(0.0),
            (self.content_height - self.height).max(0.0),
        )
    }

    /// Scroll to an absolute offset, clamped to the content
    pub fn scroll_to(&mut self, x: f32, y: f32, behavior: ScrollBehavior) -> Result<()> {
        if self.overflow == Overflow::Hidden {
            return Err(LayoutError::NotScrollable);
        }
        let (max_x, max_y) = self.max_scroll();
        let target = (x.clamp(0.0, max_x), y.clamp(0.0, max_y));

        match behavior {
            ScrollBehavior::Auto => {
                self.smooth_target = None;
                (self.scroll_x, self.scroll_y) = target;
            }
            ScrollBehavior::Smooth => self.smooth_target = Some(target),
        }
        trace!(x = target.0, y = target.1, ?behavior, "scroll_to");
        Ok(())
    }

    /// Scroll by a relative amount
    pub fn scroll_by(&mut self, dx: f32, dy: f32, behavior: ScrollBehavior) -> Result<()> {
        let (x, y) = self.smooth_target.unwrap_or((self.scroll_x, self.scroll_y));
        self.scroll_to(x + dx, y + dy, behavior)
    }

    /// Finish an in-flight smooth scroll; returns true if the offset moved
    pub fn settle(&mut self) -> bool {
        match self.smooth_target.take() {
            Some(target) => {
                (self.scroll_x, self.scroll_y) = target;
                self.clamp_offset();
                true
            }
            None => false,
        }
    }

    /// Apply a queued command
    pub fn apply(&mut self, command: PendingScroll) -> Result<()> {
        match command {
            PendingScroll::ToOffset { x, y, smooth } => {
                self.scroll_to(x, y, behavior_of(smooth))
            }
            PendingScroll::ByAmount { dx, dy, smooth } => {
                self.scroll_by(dx, dy, behavior_of(smooth))
            }
            PendingScroll::ToTop { smooth } => {
                self.scroll_to(self.scroll_x, 0.0, behavior_of(smooth))
            }
        }
    }

    fn clamp_offset(&mut self) {
        let (max_x, max_y) = self.max_scroll();
        self.scroll_x = self.scroll_x.clamp(0.0, max_x);
        self.scroll_y = self.scroll_y.clamp(0.0, max_y);
    }
}

fn behavior_of(smooth: bool) -> ScrollBehavior {
    if smooth {
        ScrollBehavior::Smooth
    } else {
        ScrollBehavior::Auto
    }
}

/// A scroll operation waiting for the next frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingScroll {
    /// Scroll to absolute offset
    ToOffset { x: f32, y: f32, smooth: bool },
    /// Scroll by relative amount
    ByAmount { dx: f32, dy: f32, smooth: bool },
    /// Scroll to top, keeping the horizontal offset
    ToTop { smooth: bool },
}

/// Cloneable handle for queueing scroll commands against the viewport
///
/// Commands are applied in the order they were queued.
#[derive(Clone, Default)]
pub struct ScrollRef {
    pending: Arc<Mutex<Vec<PendingScroll>>>,
}

impl std::fmt::Debug for ScrollRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollRef")
            .field("pending", &self.pending_len())
            .finish()
    }
}

impl ScrollRef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set absolute scroll offset
    pub fn set_scroll_offset(&self, x: f32, y: f32) {
        self.set_scroll_offset_with_behavior(x, y, ScrollBehavior::Auto);
    }

    pub fn set_scroll_offset_with_behavior(&self, x: f32, y: f32, behavior: ScrollBehavior) {
        self.push(PendingScroll::ToOffset {
            x,
            y,
            smooth: behavior == ScrollBehavior::Smooth,
        });
    }

    /// Scroll by a relative amount
    pub fn scroll_by(&self, dx: f32, dy: f32) {
        self.push(PendingScroll::ByAmount {
            dx,
            dy,
            smooth: false,
        });
    }

    /// Take every queued command (called by the host each frame)
    pub fn take_pending(&self) -> Vec<PendingScroll> {
        self.pending
            .lock()
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    fn push(&self, command: PendingScroll) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.push(command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tall_viewport() -> Viewport {
        let mut viewport = Viewport::new(1280.0, 800.0);
        viewport.set_content_size(1280.0, 4000.0);
        viewport
    }

    #[test]
    fn test_scroll_clamps_to_content() {
        let mut viewport = tall_viewport();
        viewport.scroll_to(0.0, 10_000.0, ScrollBehavior::Auto).unwrap();
        assert_eq!(viewport.offset(), (0.0, 3200.0));

        viewport.scroll_by(0.0, -5000.0, ScrollBehavior::Auto).unwrap();
        assert_eq!(viewport.offset(), (0.0, 0.0));
    }

    #[test]
    fn test_smooth_scroll_settles_later() {
        let mut viewport = tall_viewport();
        viewport.scroll_to(0.0, 600.0, ScrollBehavior::Smooth).unwrap();
        assert_eq!(viewport.offset(), (0.0, 0.0));

        assert!(viewport.settle());
        assert_eq!(viewport.offset(), (0.0, 600.0));
        assert!(!viewport.settle());
    }

    #[test]
    fn test_instant_scroll_cancels_smooth() {
        let mut viewport = tall_viewport();
        viewport.scroll_to(0.0, 600.0, ScrollBehavior::Smooth).unwrap();
        viewport.scroll_to(0.0, 0.0, ScrollBehavior::Auto).unwrap();
        assert!(!viewport.settle());
        assert_eq!(viewport.offset(), (0.0, 0.0));
    }

    #[test]
    fn test_hidden_overflow_rejects_scroll() {
        let mut viewport = Viewport::new(800.0, 600.0).with_overflow(Overflow::Hidden);
        assert_eq!(
            viewport.scroll_to(0.0, 0.0, ScrollBehavior::Auto),
            Err(LayoutError::NotScrollable)
        );
    }

    #[test]
    fn test_shrinking_content_clamps_offset() {
        let mut viewport = tall_viewport();
        viewport.scroll_to(0.0, 3000.0, ScrollBehavior::Auto).unwrap();
        viewport.set_content_size(1280.0, 1000.0);
        assert_eq!(viewport.offset(), (0.0, 200.0));
    }

    #[test]
    fn test_scroll_ref_queues_in_order() {
        let scroll_ref = ScrollRef::new();
        scroll_ref.scroll_by(0.0, 100.0);
        scroll_ref.set_scroll_offset(0.0, 0.0);
        assert_eq!(scroll_ref.pending_len(), 2);

        let pending = scroll_ref.take_pending();
        assert!(matches!(pending[0], PendingScroll::ByAmount { dy, .. } if dy == 100.0));
        assert!(matches!(
            pending[1],
            PendingScroll::ToOffset { x, y, smooth: false } if x == 0.0 && y == 0.0
        ));
        assert!(scroll_ref.take_pending().is_empty());
    }

    #[test]
    fn test_apply_commands() {
        let mut viewport = tall_viewport();
        viewport
            .apply(PendingScroll::ByAmount {
                dx: 0.0,
                dy: 1200.0,
                smooth: false,
            })
            .unwrap();
        assert_eq!(viewport.offset(), (0.0, 1200.0));

        viewport.apply(PendingScroll::ToTop { smooth: false }).unwrap();
        assert_eq!(viewport.offset(), (0.0, 0.0));
    }
}
