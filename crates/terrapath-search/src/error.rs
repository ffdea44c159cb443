use terrapath_core::{Point, Range};
use thiserror::Error;

/// Errors raised by the search engine and its worker.
///
/// None of these are search outcomes: a blocked endpoint or an exhausted
/// frontier is reported through [`SearchStatus`](crate::SearchStatus).
#[derive(Debug, Error)]
pub enum SearchError {
    /// An endpoint lies outside the cost field.
    #[error("coordinate {point} is outside the cost field {bounds}")]
    OutOfBounds { point: Point, bounds: Range },

    /// `run` was called on a search that has already been started.
    #[error("search has already been started")]
    AlreadyStarted,

    /// A node expected to exist was never materialized.
    #[error("no search node at {0}")]
    MissingNode(Point),

    /// Internal bookkeeping is inconsistent; the episode is abandoned.
    #[error("search invariant violated: {0}")]
    Invariant(String),

    /// The worker thread could not be spawned.
    #[error("failed to spawn search worker: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;
