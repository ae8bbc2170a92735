//! Rectangle geometry for coalescing same-fingerprint cells.
//!
//! Coordinates are inclusive: `x` is the column and `y` the row, both
//! 1-indexed, so a single cell is the 1x1 rectangle with equal corners.

use serde::Serialize;
use std::fmt;

use super::cell_ref::CellRef;

/// Largest distance between facing edges at which two rectangles count as
/// adjacent. At 1, rectangles must touch (edge or corner); each extra unit
/// allows one more empty cell between them.
pub const DEFAULT_TOLERANCE: u32 = 1;

/// A rectangle given by its top-left and bottom-right corners, `x1 <= x2`, `y1 <= y2`.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize)]
pub struct Rect {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
}

impl Rect {
    /// Returns None unless `top_left` is above and left of `bottom_right` (or equal).
    pub fn new(top_left: (u32, u32), bottom_right: (u32, u32)) -> Option<Rect> {
        let ((x1, y1), (x2, y2)) = (top_left, bottom_right);
        (x1 <= x2 && y1 <= y2).then_some(Rect { x1, y1, x2, y2 })
    }

    pub fn cell(cell: CellRef) -> Rect {
        Rect {
            x1: cell.col,
            y1: cell.row,
            x2: cell.col,
            y2: cell.row,
        }
    }

    pub fn top_left(&self) -> (u32, u32) {
        (self.x1, self.y1)
    }

    pub fn bottom_right(&self) -> (u32, u32) {
        (self.x2, self.y2)
    }

    pub fn width(&self) -> u64 {
        (self.x2 - self.x1) as u64 + 1
    }

    pub fn height(&self) -> u64 {
        (self.y2 - self.y1) as u64 + 1
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        (self.x1..=self.x2).contains(&cell.col) && (self.y1..=self.y2).contains(&cell.row)
    }
}

/// A1-style range, e.g. `B2:C5`; a single cell prints as `B2`.
impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let top_left = CellRef::new(self.x1, self.y1);
        if self.x1 == self.x2 && self.y1 == self.y2 {
            write!(f, "{}", top_left)
        } else {
            write!(f, "{}:{}", top_left, CellRef::new(self.x2, self.y2))
        }
    }
}

/// Whether `a` and `b` overlap or touch, per [`DEFAULT_TOLERANCE`], along both axes.
pub fn is_adjacent(a: &Rect, b: &Rect) -> bool {
    is_adjacent_within(a, b, DEFAULT_TOLERANCE)
}

pub fn is_adjacent_within(a: &Rect, b: &Rect, tolerance: u32) -> bool {
    let gap = |lo: u32, hi: u32| lo as i64 - hi as i64;
    let tolerance = tolerance as i64;
    !(gap(a.x1, b.x2) > tolerance
        || gap(b.x1, a.x2) > tolerance
        || gap(a.y1, b.y2) > tolerance
        || gap(b.y1, a.y2) > tolerance)
}

pub fn bounding_box(a: &Rect, b: &Rect) -> Rect {
    Rect {
        x1: a.x1.min(b.x1),
        y1: a.y1.min(b.y1),
        x2: a.x2.max(b.x2),
        y2: a.y2.max(b.y2),
    }
}

pub fn area(a: &Rect) -> u64 {
    a.width() * a.height()
}

/// Whether `a` and `b` are adjacent and their union is exactly their bounding box.
pub fn mergeable(a: &Rect, b: &Rect) -> bool {
    mergeable_within(a, b, DEFAULT_TOLERANCE)
}

pub fn mergeable_within(a: &Rect, b: &Rect, tolerance: u32) -> bool {
    is_adjacent_within(a, b, tolerance) && area(a) + area(b) == area(&bounding_box(a, b))
}
