//! Rectangles and edge insets in document coordinates

/// Axis-aligned rectangle (x/y are the top-left corner)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Area, never negative
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Overlapping region of two rectangles
    ///
    /// Edge-adjacent rectangles produce a zero-area intersection rather than
    /// `None`, so callers can distinguish "touching" from "disjoint".
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Grow the rectangle by the given insets (negative insets shrink it)
    pub fn expand(&self, insets: EdgeInsets) -> Rect {
        Rect::new(
            self.x - insets.left,
            self.y - insets.top,
            (self.width + insets.left + insets.right).max(0.0),
            (self.height + insets.top + insets.bottom).max(0.0),
        )
    }

    /// Move the rectangle by an offset
    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Per-edge distances, in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeInsets {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl EdgeInsets {
    pub const ZERO: EdgeInsets = EdgeInsets {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 80.0, 100.0, 100.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(50.0, 80.0, 50.0, 20.0)));
    }

    #[test]
    fn test_intersection_edge_adjacent() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(0.0, 100.0, 100.0, 50.0);
        let hit = a.intersection(&b).unwrap();
        assert_eq!(hit.area(), 0.0);

        let c = Rect::new(0.0, 100.5, 100.0, 50.0);
        assert_eq!(a.intersection(&c), None);
    }

    #[test]
    fn test_expand_and_shrink() {
        let r = Rect::new(10.0, 10.0, 100.0, 50.0);
        assert_eq!(
            r.expand(EdgeInsets::uniform(10.0)),
            Rect::new(0.0, 0.0, 120.0, 70.0)
        );
        // Shrinking past zero clamps the size
        assert_eq!(r.expand(EdgeInsets::uniform(-40.0)).height, 0.0);
    }
}
