//! Grid coordinates ([`Point`]) and rectangular areas of them ([`Range`]).

use std::cmp::Ordering;
use std::fmt;

/// A cell coordinate. X grows right, Y grows down.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Self = Self::new(0, 0);

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The point `dx` columns and `dy` rows away.
    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The eight surrounding cells, row by row from the top-left corner.
    pub fn neighbors_8(self) -> [Point; 8] {
        [
            self.shift(-1, -1),
            self.shift(0, -1),
            self.shift(1, -1),
            self.shift(-1, 0),
            self.shift(1, 0),
            self.shift(-1, 1),
            self.shift(0, 1),
            self.shift(1, 1),
        ]
    }

    /// Whether `other` is one of the eight surrounding cells.
    #[inline]
    pub fn is_adjacent(self, other: Point) -> bool {
        self != other && (self.x - other.x).abs() <= 1 && (self.y - other.y).abs() <= 1
    }
}

/// Row-major: `y` first, then `x`.
impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Half-open rectangle: `min` is inside, `max` is one past the last cell on
/// each axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: Point,
    pub max: Point,
}

impl Range {
    /// Rectangle spanned by two corners, in any order.
    #[inline]
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Point::new(x0.min(x1), y0.min(y1)),
            max: Point::new(x0.max(x1), y0.max(y1)),
        }
    }

    /// `[0, width) × [0, height)`.
    #[inline]
    pub fn sized(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub fn width(self) -> i32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(self) -> i32 {
        self.max.y - self.min.y
    }

    /// Number of cells.
    #[inline]
    pub fn cells(self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width() as usize * self.height() as usize
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    #[inline]
    pub fn contains(self, p: Point) -> bool {
        (self.min.x..self.max.x).contains(&p.x) && (self.min.y..self.max.y).contains(&p.y)
    }

    /// Every cell, row-major.
    #[inline]
    pub fn iter(self) -> Cells {
        Cells {
            range: self,
            next: 0,
            len: self.cells(),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

/// Row-major iterator returned by [`Range::iter`].
#[derive(Clone, Debug)]
pub struct Cells {
    range: Range,
    next: usize,
    len: usize,
}

impl Iterator for Cells {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.next >= self.len {
            return None;
        }
        let w = self.range.width() as usize;
        let p = self
            .range
            .min
            .shift((self.next % w) as i32, (self.next / w) as i32);
        self.next += 1;
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Cells {}
