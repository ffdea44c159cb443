//! Shared helpers for the terrapath demo binaries.
//!
//! Stand-ins for the collaborators a real host would provide: an ASCII
//! terrain format in place of terrain sampling, a cave generator for random
//! fields, and text rendering of paths and frontiers in place of debug
//! drawing.
//!
//! Map legend:
//!
//! | Glyph | Meaning |
//! |---|---|
//! | `#` | impassable (0.0) |
//! | `.` | baseline (1.0) |
//! | `,` | half speed (0.5) |
//! | `~` | quarter speed (0.25) |
//! | `S` | start, baseline terrain |
//! | `E` | end, baseline terrain |

use rand::Rng;
use terrapath_core::{CostField, FieldError, Point, Range};
use terrapath_search::{Path, SearchSnapshot};
use thiserror::Error;

const WALL: char = '#';
const PATH: char = '*';
const START_FRONTIER: char = 'o';
const END_FRONTIER: char = 'x';

/// Speed multiplier for a terrain glyph.
pub fn glyph_speed(glyph: char) -> Option<f32> {
    match glyph {
        '#' => Some(0.0),
        '.' | 'S' | 'E' => Some(1.0),
        ',' => Some(0.5),
        '~' => Some(0.25),
        _ => None,
    }
}

/// Terrain glyph closest to a speed multiplier.
pub fn speed_glyph(speed: f32) -> char {
    if speed <= 0.0 {
        WALL
    } else if speed < 0.375 {
        '~'
    } else if speed < 0.75 {
        ','
    } else {
        '.'
    }
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("map is empty")]
    Empty,
    #[error("unknown glyph {glyph:?} at {pos}")]
    UnknownGlyph { glyph: char, pos: Point },
    #[error("second {glyph:?} marker at {pos}")]
    DuplicateMarker { glyph: char, pos: Point },
    #[error("map has no {0:?} marker")]
    MissingMarker(char),
    #[error("terrain of {width}x{height} has no cells")]
    BadSize { width: i32, height: i32 },
    #[error("wall chance {0} is not between 0 and 1")]
    BadWallChance(f64),
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// A parsed ASCII map.
#[derive(Debug, Clone)]
pub struct AsciiMap {
    pub field: CostField,
    pub start: Option<Point>,
    pub end: Option<Point>,
}

impl AsciiMap {
    /// Parse a map. Blank lines are ignored; rows must have equal length.
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let mut rows = Vec::new();
        let mut start = None;
        let mut end = None;
        for line in text.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
            let y = rows.len() as i32;
            let mut row = Vec::with_capacity(line.len());
            for (x, glyph) in line.chars().enumerate() {
                let pos = Point::new(x as i32, y);
                let speed = glyph_speed(glyph).ok_or(MapError::UnknownGlyph { glyph, pos })?;
                let marker = match glyph {
                    'S' => Some(&mut start),
                    'E' => Some(&mut end),
                    _ => None,
                };
                if let Some(slot) = marker {
                    if slot.is_some() {
                        return Err(MapError::DuplicateMarker { glyph, pos });
                    }
                    *slot = Some(pos);
                }
                row.push(speed);
            }
            rows.push(row);
        }
        if rows.is_empty() {
            return Err(MapError::Empty);
        }
        let field = CostField::from_rows(rows)?;
        Ok(Self { field, start, end })
    }

    /// Both markers, or the first one missing.
    pub fn endpoints(&self) -> Result<(Point, Point), MapError> {
        let start = self.start.ok_or(MapError::MissingMarker('S'))?;
        let end = self.end.ok_or(MapError::MissingMarker('E'))?;
        Ok((start, end))
    }
}

/// Text canvas over a cost field.
pub struct Canvas {
    bounds: Range,
    cells: Vec<char>,
}

impl Canvas {
    /// Draw the terrain of `field`.
    pub fn new(field: &CostField) -> Self {
        let bounds = field.bounds();
        let cells = bounds.iter().map(|p| speed_glyph(field.speed_at(p))).collect();
        Self { bounds, cells }
    }

    /// Set one cell; points outside the field are ignored.
    pub fn put(&mut self, p: Point, glyph: char) {
        if self.bounds.contains(p) {
            let i = ((p.y - self.bounds.min.y) * self.bounds.width() + p.x - self.bounds.min.x)
                as usize;
            self.cells[i] = glyph;
        }
    }

    /// Mark the interior of a path.
    pub fn path(&mut self, path: &Path) -> &mut Self {
        let points = path.points();
        if points.len() > 2 {
            for &p in &points[1..points.len() - 1] {
                self.put(p, PATH);
            }
        }
        self
    }

    /// Mark both frontiers of a snapshot.
    pub fn frontiers(&mut self, snapshot: &SearchSnapshot) -> &mut Self {
        for n in &snapshot.start_frontier {
            self.put(n.position, START_FRONTIER);
        }
        for n in &snapshot.end_frontier {
            self.put(n.position, END_FRONTIER);
        }
        self
    }

    /// Mark start and end.
    pub fn endpoints(&mut self, start: Point, end: Point) -> &mut Self {
        self.put(start, 'S');
        self.put(end, 'E');
        self
    }

    pub fn render(&self) -> String {
        let w = self.bounds.width().max(1) as usize;
        let mut out = String::with_capacity(self.cells.len() + self.cells.len() / w);
        for row in self.cells.chunks(w) {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}

/// Cave rule: a cell becomes wall when at least `wall_cutoff` of its eight
/// neighbors are walls (out-of-range counts as wall).
#[derive(Debug, Clone, Copy)]
pub struct CaveRule {
    pub wall_cutoff: u32,
    pub reps: u32,
}

impl Default for CaveRule {
    fn default() -> Self {
        Self {
            wall_cutoff: 5,
            reps: 4,
        }
    }
}

/// Random cave-like terrain: walls from a cellular automaton, open cells
/// given a random mix of terrain speeds.
pub fn random_terrain<R: Rng>(
    rng: &mut R,
    width: i32,
    height: i32,
    wall_pct: f64,
    rule: CaveRule,
) -> Result<CostField, MapError> {
    if width <= 0 || height <= 0 {
        return Err(MapError::BadSize { width, height });
    }
    if !(0.0..=1.0).contains(&wall_pct) {
        return Err(MapError::BadWallChance(wall_pct));
    }
    let bounds = Range::sized(width, height);
    let idx = |p: Point| (p.y * width + p.x) as usize;
    let mut walls: Vec<bool> = bounds.iter().map(|_| rng.random_bool(wall_pct)).collect();
    let mut scratch = walls.clone();
    for _ in 0..rule.reps {
        for p in bounds.iter() {
            let count = p
                .neighbors_8()
                .iter()
                .filter(|&&n| !bounds.contains(n) || walls[idx(n)])
                .count() as u32;
            scratch[idx(p)] = count >= rule.wall_cutoff;
        }
        std::mem::swap(&mut walls, &mut scratch);
    }
    let speeds = walls
        .into_iter()
        .map(|wall| match (wall, rng.random_range(0..10)) {
            (true, _) => 0.0,
            (false, 0) => 0.25,
            (false, 1 | 2) => 0.5,
            _ => 1.0,
        })
        .collect();
    Ok(CostField::new(width, height, speeds)?)
}

/// A random traversable cell, if any exists.
pub fn random_open<R: Rng>(rng: &mut R, field: &CostField) -> Option<Point> {
    let open: Vec<Point> = field.bounds().iter().filter(|&p| field.is_traversable(p)).collect();
    if open.is_empty() {
        None
    } else {
        Some(open[rng.random_range(0..open.len())])
    }
}
