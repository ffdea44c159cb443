use std::fmt;

use terrapath_core::Point;

/// How a search episode ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchStatus {
    /// A route from start to end was found.
    PathFound,
    /// A frontier ran empty before the searches met.
    FrontierExhausted,
    /// The start cell is impassable.
    StartBlocked,
    /// The end cell is impassable.
    EndBlocked,
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SearchStatus::PathFound => "PathFound",
            SearchStatus::FrontierExhausted => "FrontierExhausted",
            SearchStatus::StartBlocked => "StartBlocked",
            SearchStatus::EndBlocked => "EndBlocked",
        };
        f.write_str(s)
    }
}

/// An ordered start-to-end route and its traversal cost.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Path {
    points: Vec<Point>,
    cost: f32,
}

impl Path {
    pub(crate) fn new(points: Vec<Point>, cost: f32) -> Self {
        Self { points, cost }
    }

    /// Coordinates from start to end, both inclusive.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Total cost of walking the path.
    #[inline]
    pub fn cost(&self) -> f32 {
        self.cost
    }

    /// Number of coordinates.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First coordinate.
    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    /// Last coordinate.
    pub fn end(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Whether every consecutive pair is 8-adjacent.
    pub fn is_contiguous(&self) -> bool {
        self.points.windows(2).all(|w| w[0].is_adjacent(w[1]))
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

/// Immutable result of one search episode.
///
/// `path` is present exactly when `status` is [`SearchStatus::PathFound`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PathOutcome {
    status: SearchStatus,
    path: Option<Path>,
}

impl PathOutcome {
    pub(crate) fn found(path: Path) -> Self {
        Self {
            status: SearchStatus::PathFound,
            path: Some(path),
        }
    }

    pub(crate) fn failed(status: SearchStatus) -> Self {
        debug_assert_ne!(status, SearchStatus::PathFound);
        Self { status, path: None }
    }

    #[inline]
    pub fn status(&self) -> SearchStatus {
        self.status
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        self.status == SearchStatus::PathFound
    }

    #[inline]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn into_path(self) -> Option<Path> {
        self.path
    }
}

// Stored paths and outcomes are checked against the same rules the engine
// upholds when it builds them.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Path {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        #[derive(serde::Deserialize)]
        struct Parts {
            points: Vec<Point>,
            cost: f32,
        }

        let Parts { points, cost } = Parts::deserialize(deserializer)?;
        let path = Path::new(points, cost);
        if path.is_empty() {
            return Err(D::Error::custom("path has no points"));
        }
        if !path.is_contiguous() {
            return Err(D::Error::custom("path points are not 8-adjacent"));
        }
        if !cost.is_finite() || cost < 0.0 {
            return Err(D::Error::custom(format!("invalid path cost {cost}")));
        }
        Ok(path)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PathOutcome {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        #[derive(serde::Deserialize)]
        struct Parts {
            status: SearchStatus,
            path: Option<Path>,
        }

        let Parts { status, path } = Parts::deserialize(deserializer)?;
        match (status, path) {
            (SearchStatus::PathFound, Some(path)) => Ok(PathOutcome::found(path)),
            (SearchStatus::PathFound, None) => Err(D::Error::custom("PathFound without a path")),
            (status, None) => Ok(PathOutcome::failed(status)),
            (status, Some(_)) => Err(D::Error::custom(format!("{status} carries a path"))),
        }
    }
}

impl fmt::Display for PathOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.path.as_ref().map_or(0, Path::len);
        write!(
            f,
            "path found: {} | status: {} | length: {}",
            self.is_found(),
            self.status,
            len
        )
    }
}
