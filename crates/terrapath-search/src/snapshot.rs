//! Read-only views of an in-progress search for visualization.
//!
//! Snapshots are plain copies. The worker builds a fresh one and swaps it
//! into a [`SnapshotSlot`]; readers clone whatever is there. A snapshot may
//! be stale by the time it is read and must never be used to coordinate
//! with the worker.

use std::sync::{Arc, Mutex};

use terrapath_core::Point;

use crate::registry::Side;

/// One frontier entry as seen by a visualizer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrontierNode {
    pub position: Point,
    pub priority: f32,
    /// Cost from the node's own anchor.
    pub g: f32,
    pub origin: Side,
}

/// Copy of both frontiers and the most recently popped nodes.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchSnapshot {
    /// Completed main-loop iterations.
    pub iteration: u64,
    pub current_start: Option<Point>,
    pub current_end: Option<Point>,
    /// Start-side frontier in pop order.
    pub start_frontier: Vec<FrontierNode>,
    /// End-side frontier in pop order.
    pub end_frontier: Vec<FrontierNode>,
}

impl SearchSnapshot {
    /// Total entries across both frontiers.
    pub fn frontier_len(&self) -> usize {
        self.start_frontier.len() + self.end_frontier.len()
    }
}

/// Shared holder for the latest published snapshot.
#[derive(Clone, Debug, Default)]
pub struct SnapshotSlot {
    inner: Arc<Mutex<Option<SearchSnapshot>>>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored snapshot.
    pub fn publish(&self, snapshot: SearchSnapshot) {
        // Poisoning cannot leave a half-written snapshot behind.
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(snapshot);
    }

    /// Clone of the latest snapshot, if any has been published.
    pub fn latest(&self) -> Option<SearchSnapshot> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.clone()
    }
}
