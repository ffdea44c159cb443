//! **terrapath-core**: core types for terrain pathfinding.
//!
//! This crate provides the foundational types shared by the search engine
//! and its callers: grid geometry, the immutable speed-multiplier
//! [`CostField`], and the cooperative [`CancelToken`] used to stop a search
//! running on another thread.

pub mod cancel;
pub mod field;
pub mod geom;

pub use cancel::CancelToken;
pub use field::{CostField, FieldError, MIN_SPEED};
pub use geom::{Point, Range};
