//! [`CostField`]: an immutable 2D grid of traversal-speed
//! multipliers.
//!
//! Each cell stores how fast an agent moves across it relative to baseline
//! terrain: `1.0` is baseline, `0.5` is half speed and `0.0` means the cell is
//! impassable. The field is supplied once and never mutated afterwards, so it
//! can be moved into a search worker without synchronisation.

use std::ops::Index;

use thiserror::Error;

use crate::geom::{Point, Range};

/// Errors raised while building a [`CostField`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// The number of multipliers does not match `width * height`.
    #[error("cost field of {width}x{height} needs {expected} cells, got {actual}")]
    SizeMismatch {
        width: i32,
        height: i32,
        expected: usize,
        actual: usize,
    },
    /// Rows passed to [`CostField::from_rows`] have different lengths.
    #[error("row {row} has {actual} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        actual: usize,
    },
    /// A multiplier is negative, NaN, infinite, or positive but below
    /// [`MIN_SPEED`].
    #[error("invalid speed multiplier {value} at {pos}")]
    InvalidSpeed { pos: Point, value: f32 },
}

/// Smallest positive multiplier a field accepts.
///
/// Slower cells would make a single step cost overflow `f32`. Use `0.0` for
/// impassable terrain instead.
pub const MIN_SPEED: f32 = 1e-6;

/// Whether `v` is a multiplier a [`CostField`] can hold.
#[inline]
pub fn is_valid_speed(v: f32) -> bool {
    v == 0.0 || (v.is_finite() && v >= MIN_SPEED)
}

/// Immutable width×height grid of non-negative speed multipliers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CostField {
    speeds: Vec<f32>,
    width: i32,
    height: i32,
}

impl CostField {
    /// Build a field from row-major multipliers.
    pub fn new(width: i32, height: i32, speeds: Vec<f32>) -> Result<Self, FieldError> {
        let expected = (width.max(0) as usize) * (height.max(0) as usize);
        if speeds.len() != expected {
            return Err(FieldError::SizeMismatch {
                width,
                height,
                expected,
                actual: speeds.len(),
            });
        }
        let w = width.max(1) as usize;
        if let Some((i, &value)) = speeds
            .iter()
            .enumerate()
            .find(|(_, v)| !is_valid_speed(**v))
        {
            let pos = Point::new((i % w) as i32, (i / w) as i32);
            return Err(FieldError::InvalidSpeed { pos, value });
        }
        Ok(Self {
            speeds,
            width: width.max(0),
            height: height.max(0),
        })
    }

    /// Build a field from a list of rows (`rows[y][x]`).
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, FieldError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut speeds = Vec::with_capacity(width * height);
        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != width {
                return Err(FieldError::Ragged {
                    row,
                    expected: width,
                    actual: cells.len(),
                });
            }
            speeds.extend(cells);
        }
        Self::new(width as i32, height as i32, speeds)
    }

    /// A field where every cell has the same multiplier.
    pub fn filled(width: i32, height: i32, speed: f32) -> Result<Self, FieldError> {
        let len = (width.max(0) as usize) * (height.max(0) as usize);
        Self::new(width, height, vec![speed; len])
    }

    /// Width in cells.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in cells.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// The rectangle of valid coordinates.
    #[inline]
    pub fn bounds(&self) -> Range {
        Range::sized(self.width, self.height)
    }

    /// Whether `p` lies inside the field.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.bounds().contains(p)
    }

    #[inline]
    fn offset(&self, p: Point) -> Option<usize> {
        if self.contains(p) {
            Some((p.y as usize) * (self.width as usize) + (p.x as usize))
        } else {
            None
        }
    }

    /// Multiplier at `p`, or `None` outside the field.
    #[inline]
    pub fn get(&self, p: Point) -> Option<f32> {
        self.offset(p).map(|i| self.speeds[i])
    }

    /// Multiplier at `p`.
    ///
    /// # Panics
    ///
    /// Panics if `p` lies outside the field. Asking for a cell that does not
    /// exist is a caller bug, not a search outcome.
    #[inline]
    #[track_caller]
    pub fn speed_at(&self, p: Point) -> f32 {
        match self.get(p) {
            Some(speed) => speed,
            None => panic!("coordinate {p} is outside the cost field {}", self.bounds()),
        }
    }

    /// Whether `p` is inside the field and has a positive multiplier.
    #[inline]
    pub fn is_traversable(&self, p: Point) -> bool {
        self.get(p).is_some_and(|s| s > 0.0)
    }

    /// Largest multiplier in the field (0 for an empty field).
    pub fn max_speed(&self) -> f32 {
        self.speeds.iter().copied().fold(0.0, f32::max)
    }

    /// Iterate over `(Point, multiplier)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, f32)> + '_ {
        self.bounds().iter().zip(self.speeds.iter().copied())
    }
}

// Deserialization goes through `new` so a stored field is checked like a
// constructed one.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CostField {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Parts {
            speeds: Vec<f32>,
            width: i32,
            height: i32,
        }

        let parts = Parts::deserialize(deserializer)?;
        CostField::new(parts.width, parts.height, parts.speeds).map_err(serde::de::Error::custom)
    }
}

impl Index<Point> for CostField {
    type Output = f32;

    #[track_caller]
    fn index(&self, p: Point) -> &f32 {
        match self.offset(p) {
            Some(i) => &self.speeds[i],
            None => panic!("coordinate {p} is outside the cost field {}", self.bounds()),
        }
    }
}
