//! Lazily materialized search nodes, one per coordinate per episode.

use std::collections::HashMap;
use std::fmt;

use terrapath_core::Point;

use crate::distance;
use crate::error::{Result, SearchError};

/// Which of the two simultaneous searches a node belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    /// The search rooted at the start coordinate.
    Start,
    /// The search rooted at the end coordinate.
    End,
}

impl Side {
    /// The other side.
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Start => Side::End,
            Side::End => Side::Start,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Start => f.write_str("start"),
            Side::End => f.write_str("end"),
        }
    }
}

/// Index of a node inside its [`NodeRegistry`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Per-coordinate search state.
#[derive(Clone, Debug)]
pub struct SearchNode {
    position: Point,
    /// Cost from the anchor of the node's own side; `INFINITY` until reached.
    pub g: f32,
    h: f32,
    /// Set once the node has been expanded.
    pub closed: bool,
    /// Back-pointer toward the node's anchor.
    pub parent: Option<NodeId>,
    origin: Side,
}

impl SearchNode {
    /// Coordinate of this node.
    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Heuristic estimate to the far anchor, fixed at creation.
    #[inline]
    pub fn h(&self) -> f32 {
        self.h
    }

    /// Estimated total cost through this node.
    #[inline]
    pub fn f(&self) -> f32 {
        self.g + self.h
    }

    /// The side that discovered this node.
    #[inline]
    pub fn origin(&self) -> Side {
        self.origin
    }

    /// Whether the node has been reached by its own side.
    #[inline]
    pub fn is_reached(&self) -> bool {
        self.g.is_finite()
    }
}

/// Owns every node materialized during one search episode.
///
/// Nodes live in an arena and are addressed by [`NodeId`]; a coordinate
/// index guarantees a single node per coordinate.
#[derive(Debug)]
pub struct NodeRegistry {
    nodes: Vec<SearchNode>,
    index: HashMap<Point, NodeId>,
    heuristic_scale: f32,
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl NodeRegistry {
    /// Create an empty registry. Heuristic values are multiplied by
    /// `heuristic_scale`.
    pub fn new(heuristic_scale: f32) -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            heuristic_scale,
        }
    }

    /// Scaled octile estimate between two coordinates.
    #[inline]
    pub fn heuristic(&self, from: Point, to: Point) -> f32 {
        distance::octile(from, to) * self.heuristic_scale
    }

    /// Return the node at `pos`, creating it (unreached, open) with an
    /// estimate toward `target` and the given `origin` if it does not exist.
    pub fn get_or_create(&mut self, pos: Point, target: Point, origin: Side) -> NodeId {
        if let Some(&id) = self.index.get(&pos) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        let h = self.heuristic(pos, target);
        self.nodes.push(SearchNode {
            position: pos,
            g: f32::INFINITY,
            h,
            closed: false,
            parent: None,
            origin,
        });
        self.index.insert(pos, id);
        id
    }

    /// Look up an existing node.
    pub fn get(&self, pos: Point) -> Result<NodeId> {
        self.index
            .get(&pos)
            .copied()
            .ok_or(SearchError::MissingNode(pos))
    }

    /// Look up an existing node without treating absence as an error.
    #[inline]
    pub fn find(&self, pos: Point) -> Option<NodeId> {
        self.index.get(&pos).copied()
    }

    /// Borrow a node.
    #[inline]
    pub fn node(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.index()]
    }

    /// Mutably borrow a node.
    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.index()]
    }

    /// Number of materialized nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node has been materialized yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
