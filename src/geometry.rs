//! Conversions between pixel coordinates and the sprint/resource grid.

use crate::constants::{ROW_COUNT, ROW_HEIGHT, SPRINT_COUNT, SPRINT_WIDTH};

/// Fixed dimensions of the timeline grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub sprint_width: i32,
    pub row_height: i32,
    pub sprint_count: i32,
    pub row_count: i32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            sprint_width: SPRINT_WIDTH,
            row_height: ROW_HEIGHT,
            sprint_count: SPRINT_COUNT,
            row_count: ROW_COUNT,
        }
    }
}

/// An axis-aligned rectangle in timeline pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.left.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.top.saturating_add(self.height)
    }

    /// Strict overlap: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &PixelRect) -> bool {
        self.top < other.bottom()
            && self.bottom() > other.top
            && self.left < other.right()
            && self.right() > other.left
    }
}

impl GridSpec {
    /// Rounds a horizontal pixel offset to the nearest column boundary (half rounds up).
    pub fn snap_to_column(&self, x: f32) -> i32 {
        snap(x, self.sprint_width)
    }

    /// Rounds a vertical pixel offset to the nearest row boundary (half rounds up).
    pub fn snap_to_row(&self, y: f32) -> i32 {
        snap(y, self.row_height)
    }

    /// Index of the column containing `x`.
    pub fn column_at(&self, x: f32) -> i32 {
        (x / self.sprint_width as f32).floor() as i32
    }

    /// Index of the row containing `y`.
    pub fn row_at(&self, y: f32) -> i32 {
        (y / self.row_height as f32).floor() as i32
    }

    pub fn column_left(&self, column: i32) -> i32 {
        column * self.sprint_width
    }

    pub fn row_top(&self, row: i32) -> i32 {
        row * self.row_height
    }

    pub fn is_aligned(&self, left: i32, top: i32) -> bool {
        left >= 0 && top >= 0 && left % self.sprint_width == 0 && top % self.row_height == 0
    }

    /// Pixel size of a `width` x `resource_count` block, saturating at `i32::MAX`.
    pub fn span_px(&self, width: u32, resource_count: u32) -> (i32, i32) {
        (
            cells_px(width, self.sprint_width),
            cells_px(resource_count, self.row_height),
        )
    }

    /// True if `rect` lies inside the drawn timeline.
    pub fn contains(&self, rect: &PixelRect) -> bool {
        let (w, h) = self.timeline_px();
        rect.left >= 0 && rect.top >= 0 && rect.right() <= w && rect.bottom() <= h
    }

    /// Largest aligned origin at which a `width` x `resource_count` block still fits.
    pub fn max_origin(&self, width: u32, resource_count: u32) -> (i32, i32) {
        let (w, h) = self.timeline_px();
        let (span_w, span_h) = self.span_px(width, resource_count);
        (
            self.column_left(w.saturating_sub(span_w).max(0) / self.sprint_width),
            self.row_top(h.saturating_sub(span_h).max(0) / self.row_height),
        )
    }

    /// Full pixel extent of the drawn timeline.
    pub fn timeline_px(&self) -> (i32, i32) {
        (
            self.sprint_count * self.sprint_width,
            self.row_count * self.row_height,
        )
    }
}

fn cells_px(count: u32, unit: i32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX).saturating_mul(unit)
}

fn snap(value: f32, unit: i32) -> i32 {
    let unit_f = unit as f32;
    ((value / unit_f + 0.5).floor() as i32).saturating_mul(unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_rounds_to_nearest_column() {
        let grid = GridSpec::default();
        assert_eq!(grid.snap_to_column(0.0), 0);
        assert_eq!(grid.snap_to_column(59.0), 0);
        assert_eq!(grid.snap_to_column(60.0), 120);
        assert_eq!(grid.snap_to_column(179.9), 120);
        assert_eq!(grid.snap_to_column(-59.0), 0);
        assert_eq!(grid.snap_to_row(24.0), 0);
        assert_eq!(grid.snap_to_row(25.0), 50);
    }

    #[test]
    fn snapped_value_is_a_close_multiple() {
        let grid = GridSpec::default();
        let mut x = -500.0_f32;
        while x < 4000.0 {
            let v = grid.snap_to_column(x);
            assert_eq!(v % grid.sprint_width, 0, "x = {x}");
            assert!((v as f32 - x).abs() <= grid.sprint_width as f32 / 2.0, "x = {x}");
            x += 7.3;
        }
    }

    #[test]
    fn cells_floor_pointer_positions() {
        let grid = GridSpec::default();
        assert_eq!(grid.column_at(119.0), 0);
        assert_eq!(grid.column_at(120.0), 1);
        assert_eq!(grid.row_at(99.0), 1);
        assert_eq!(grid.row_at(-1.0), -1);
    }

    #[test]
    fn alignment_rejects_negative_and_partial_cells() {
        let grid = GridSpec::default();
        assert!(grid.is_aligned(240, 100));
        assert!(!grid.is_aligned(-120, 0));
        assert!(!grid.is_aligned(130, 0));
        assert!(!grid.is_aligned(0, 10));
    }

    #[test]
    fn shared_edges_do_not_intersect() {
        let a = PixelRect::new(0, 0, 120, 50);
        assert!(!a.intersects(&PixelRect::new(120, 0, 120, 50)));
        assert!(!a.intersects(&PixelRect::new(0, 50, 120, 50)));
        assert!(!a.intersects(&PixelRect::new(120, 50, 120, 50)));
        assert!(a.intersects(&PixelRect::new(119, 49, 120, 50)));
    }

    #[test]
    fn huge_spans_saturate_instead_of_overflowing() {
        let grid = GridSpec::default();
        assert_eq!(grid.span_px(20_000_000, 1), (i32::MAX, 50));
        assert_eq!(grid.span_px(u32::MAX, u32::MAX), (i32::MAX, i32::MAX));
        let rect = PixelRect::new(i32::MAX - 10, 0, 120, 50);
        assert_eq!(rect.right(), i32::MAX);
        assert_eq!(grid.snap_to_column(f32::MAX), i32::MAX);
    }

    #[test]
    fn timeline_bounds() {
        let grid = GridSpec::default();
        assert!(grid.contains(&PixelRect::new(25 * 120, 49 * 50, 120, 50)));
        assert!(!grid.contains(&PixelRect::new(25 * 120, 0, 240, 50)));
        assert!(!grid.contains(&PixelRect::new(0, 49 * 50, 120, 100)));
        assert_eq!(grid.max_origin(1, 1), (25 * 120, 49 * 50));
        assert_eq!(grid.max_origin(26, 50), (0, 0));
        assert_eq!(grid.max_origin(40, 1), (0, 49 * 50));
    }
}
