use terrapath_core::Point;

use crate::distance::{DIAGONAL_STEP, ORTHOGONAL_STEP};

/// One move to an adjacent cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Step {
    /// The cell moved into.
    pub to: Point,
    /// Baseline length of the move (1 or √2) before terrain speed applies.
    pub length: f32,
}

/// Cached neighbor computation helper.
///
/// Enumerates the eight cells around a point, filtered by a predicate, into
/// a reusable buffer.
pub struct Neighbors {
    buf: Vec<Step>,
}

impl Default for Neighbors {
    fn default() -> Self {
        Self::new()
    }
}

impl Neighbors {
    /// Create a new `Neighbors` helper.
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(8),
        }
    }

    /// Return 8-directional steps out of `p`, keeping only those whose
    /// destination satisfies `keep`. Order is row-major and stable.
    pub fn all(&mut self, p: Point, keep: impl Fn(Point) -> bool) -> &[Step] {
        self.buf.clear();
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let n = p.shift(dx, dy);
                if keep(n) {
                    let length = if dx != 0 && dy != 0 {
                        DIAGONAL_STEP
                    } else {
                        ORTHOGONAL_STEP
                    };
                    self.buf.push(Step { to: n, length });
                }
            }
        }
        &self.buf
    }
}
