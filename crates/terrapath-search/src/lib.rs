//! Bidirectional A* over terrain speed fields.
//!
//! A search runs two A* instances at once, one from the start and one from
//! the end, and splices their back-pointer chains when they meet:
//!
//! - [`SearchEngine`] drives one episode step by step on the calling thread.
//! - [`PathSearch`] moves an engine onto a worker thread with cooperative
//!   cancellation and a single-shot [`Completion`].
//! - [`PathOutcome`] reports a [`SearchStatus`] and, when found, a [`Path`].
//!
//! # Costs
//!
//! Stepping into a cell costs the step length (1 orthogonally, √2
//! diagonally) divided by that cell's speed multiplier. The octile distance
//! is the heuristic; [`SpeedPolicy`] decides how multipliers above 1 are
//! kept from breaking it.
//!
//! | Type | Role |
//! |---|---|
//! | [`NodeRegistry`] | one lazily created node per coordinate |
//! | [`Frontier`] | de-duplicating min-priority queue |
//! | [`Chain`] | reverse / append helpers used to splice the halves |
//! | [`SpeedMap`] | read-only source of multipliers ([`CostField`](terrapath_core::CostField) implements it) |

mod chain;
mod config;
mod distance;
mod engine;
mod error;
mod frontier;
mod neighbors;
mod outcome;
mod registry;
mod runner;
mod snapshot;
mod traits;

pub use chain::{Chain, Link};
pub use config::{SearchConfig, SpeedPolicy};
pub use distance::{DIAGONAL_STEP, ORTHOGONAL_STEP, octile};
pub use engine::{EngineState, SearchEngine};
pub use error::{Result, SearchError};
pub use frontier::{Frontier, FrontierEntry};
pub use neighbors::{Neighbors, Step};
pub use outcome::{Path, PathOutcome, SearchStatus};
pub use registry::{NodeId, NodeRegistry, SearchNode, Side};
pub use runner::{Completion, PathSearch};
pub use snapshot::{FrontierNode, SearchSnapshot, SnapshotSlot};
pub use traits::SpeedMap;
