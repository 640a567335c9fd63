//! Pointer input for brush strokes
//!
//! Pointer positions arrive in display space; [`DisplayGeometry`] maps them
//! onto the mask's backing raster. [`StrokeTracker`] turns a pointer-down,
//! move, up sequence into connected segments and remembers whether the
//! finished stroke needs a new export.

use super::brush::Point;

/// Which button a pointer event was reported with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    /// Pen or touch contact without a button
    NoButton,
    Secondary,
    Middle,
}

impl PointerButton {
    pub fn can_paint(self) -> bool {
        matches!(self, PointerButton::Primary | PointerButton::NoButton)
    }
}

/// Where and how large the rendered mask appears on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    /// Top-left corner of the render surface in display space
    pub origin: Point,
    /// Rendered width and height in display space
    pub displayed: (f32, f32),
    /// Backing raster size of the mask
    pub backing: (u32, u32),
}

impl DisplayGeometry {
    /// Display space equals raster space
    pub fn identity(width: u32, height: u32) -> Self {
        Self {
            origin: Point::new(0.0, 0.0),
            displayed: (width as f32, height as f32),
            backing: (width, height),
        }
    }

    /// Map a display position to raster coordinates.
    ///
    /// Returns `None` if the mapping is undefined (e.g. a zero-sized surface).
    pub fn to_raster(&self, position: Point) -> Option<Point> {
        let scale_x = self.backing.0 as f32 / self.displayed.0;
        let scale_y = self.backing.1 as f32 / self.displayed.1;
        let x = (position.x - self.origin.x) * scale_x;
        let y = (position.y - self.origin.y) * scale_y;

        if x.is_nan() || y.is_nan() || x.is_infinite() || y.is_infinite() {
            return None;
        }
        Some(Point::new(x, y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum StrokeState {
    #[default]
    Idle,
    Stroking {
        last: Point,
    },
}

/// Tracks one active stroke at a time
#[derive(Debug, Default)]
pub struct StrokeTracker {
    state: StrokeState,
    export_pending: bool,
}

impl StrokeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_stroking(&self) -> bool {
        matches!(self.state, StrokeState::Stroking { .. })
    }

    /// Start a stroke at `point`; the returned zero-length segment paints the initial dot
    pub fn begin(&mut self, point: Point) -> (Point, Point) {
        self.state = StrokeState::Stroking { last: point };
        self.export_pending = true;
        (point, point)
    }

    /// Continue the active stroke, returning the segment to paint
    pub fn extend(&mut self, point: Point) -> Option<(Point, Point)> {
        match self.state {
            StrokeState::Stroking { last } => {
                self.state = StrokeState::Stroking { last: point };
                self.export_pending = true;
                Some((last, point))
            }
            StrokeState::Idle => None,
        }
    }

    /// End the active stroke.
    ///
    /// Returns `true` exactly once per stroke that painted anything, signalling
    /// that the export artifact should be regenerated.
    pub fn finish(&mut self) -> bool {
        if !self.is_stroking() {
            return false;
        }
        self.state = StrokeState::Idle;
        std::mem::take(&mut self.export_pending)
    }

    /// Drop any stroke in progress without requesting an export
    pub fn clear(&mut self) {
        self.state = StrokeState::Idle;
        self.export_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_positions_are_rescaled() {
        let geometry = DisplayGeometry {
            origin: Point::new(100.0, 50.0),
            displayed: (400.0, 300.0),
            backing: (1600, 1200),
        };
        let p = geometry.to_raster(Point::new(200.0, 80.0)).unwrap();
        assert_eq!(p, Point::new(400.0, 120.0));
    }

    #[test]
    fn degenerate_surface_yields_none() {
        let geometry = DisplayGeometry {
            origin: Point::new(0.0, 0.0),
            displayed: (0.0, 0.0),
            backing: (10, 10),
        };
        assert!(geometry.to_raster(Point::new(5.0, 5.0)).is_none());
        // 0 / 0 at the origin is NaN as well.
        assert!(geometry.to_raster(Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn stroke_segments_connect() {
        let mut tracker = StrokeTracker::new();
        assert!(tracker.extend(Point::new(1.0, 1.0)).is_none());

        let a = Point::new(1.0, 1.0);
        let b = Point::new(4.0, 2.0);
        let c = Point::new(9.0, 3.0);
        assert_eq!(tracker.begin(a), (a, a));
        assert_eq!(tracker.extend(b), Some((a, b)));
        assert_eq!(tracker.extend(c), Some((b, c)));
    }

    #[test]
    fn export_requested_once_per_stroke() {
        let mut tracker = StrokeTracker::new();
        assert!(!tracker.finish());

        tracker.begin(Point::new(0.0, 0.0));
        tracker.extend(Point::new(1.0, 0.0));
        tracker.extend(Point::new(2.0, 0.0));
        assert!(tracker.finish());
        assert!(!tracker.finish());
        assert!(!tracker.is_stroking());
    }

    #[test]
    fn clear_drops_pending_export() {
        let mut tracker = StrokeTracker::new();
        tracker.begin(Point::new(0.0, 0.0));
        tracker.clear();
        assert!(!tracker.finish());
    }

    #[test]
    fn only_primary_or_contact_paints() {
        assert!(PointerButton::Primary.can_paint());
        assert!(PointerButton::NoButton.can_paint());
        assert!(!PointerButton::Secondary.can_paint());
        assert!(!PointerButton::Middle.can_paint());
    }
}
