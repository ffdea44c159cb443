//! Explicit path chains and the pure reverse / append helpers used to splice
//! the two half-searches together.
//!
//! A [`Chain`] is a copy of a back-pointer chain taken out of the registry,
//! ordered from its root (cost 0) to its head. Splicing works on these
//! copies only, so the registry's parent links are never rewritten.

use terrapath_core::Point;

use crate::error::{Result, SearchError};
use crate::outcome::Path;
use crate::registry::{NodeId, NodeRegistry};

/// One coordinate of a chain with its cost measured from the chain root.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Link {
    pub position: Point,
    pub g: f32,
}

/// Root-to-head sequence of links with non-decreasing costs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chain {
    links: Vec<Link>,
}

impl Chain {
    /// Wrap an explicit root-to-head link list.
    pub fn from_links(links: Vec<Link>) -> Self {
        Self { links }
    }

    /// Follow parent pointers from `head` to its anchor.
    ///
    /// A walk longer than the registry means the parent links form a cycle,
    /// which is reported as an invariant violation.
    pub fn trace(registry: &NodeRegistry, head: NodeId) -> Result<Self> {
        let mut links = Vec::new();
        let mut cur = Some(head);
        while let Some(id) = cur {
            if links.len() >= registry.len() {
                return Err(SearchError::Invariant(format!(
                    "parent chain from {} does not terminate",
                    registry.node(head).position()
                )));
            }
            let node = registry.node(id);
            links.push(Link {
                position: node.position(),
                g: node.g,
            });
            cur = node.parent;
        }
        links.reverse();
        Ok(Self { links })
    }

    /// The links, root first.
    #[inline]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Cost at the head (0 for an empty chain).
    #[inline]
    pub fn head_cost(&self) -> f32 {
        self.links.last().map_or(0.0, |l| l.g)
    }

    /// The same coordinates head-to-root, with every cost re-measured from
    /// the old head: `g' = g_head - g`.
    pub fn reversed(&self) -> Chain {
        let total = self.head_cost();
        let links = self
            .links
            .iter()
            .rev()
            .map(|l| Link {
                position: l.position,
                g: total - l.g,
            })
            .collect();
        Chain { links }
    }

    /// Attach `suffix` after this chain's head. Moving from the head to the
    /// suffix root costs `join_cost`; every suffix cost is shifted by
    /// `head_cost + join_cost`.
    pub fn appended(mut self, suffix: Chain, join_cost: f32) -> Chain {
        let offset = self.head_cost() + join_cost;
        self.links.extend(suffix.links.into_iter().map(|l| Link {
            position: l.position,
            g: l.g + offset,
        }));
        self
    }

    /// Convert into a [`Path`] whose cost is the head cost.
    pub fn into_path(self) -> Path {
        let cost = self.head_cost();
        Path::new(self.links.into_iter().map(|l| l.position).collect(), cost)
    }
}
