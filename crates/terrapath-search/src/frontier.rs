//! De-duplicating min-priority frontier.
//!
//! Entries live in a [`BinaryHeap`] keyed by `(priority, insertion_order)`.
//! Lowering a priority pushes a fresh heap entry and records the new value
//! in the live table; heap entries that no longer match the live table are
//! discarded on pop. Logically every coordinate appears at most once.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use terrapath_core::Point;

use crate::registry::NodeId;

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    priority: f32,
    /// Insertion order of the coordinate, kept across decreases.
    seq: u64,
    pos: Point,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Wrapped in Reverse for the heap: smaller priority first, then
        // earlier insertion.
        self.priority
            .total_cmp(&other.priority)
            .then(self.seq.cmp(&other.seq))
    }
}

#[derive(Debug, Clone, Copy)]
struct Live {
    id: NodeId,
    priority: f32,
    seq: u64,
}

/// A frontier entry as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrontierEntry {
    pub id: NodeId,
    pub position: Point,
    pub priority: f32,
}

/// Min-priority queue of discovered-but-unexpanded nodes.
#[derive(Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<Reverse<HeapEntry>>,
    live: HashMap<Point, Live>,
    seq: u64,
}

impl Frontier {
    /// Create an empty frontier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `id` at `pos` if absent; if present with a higher priority,
    /// lower it. Returns `true` if the frontier changed.
    pub fn insert_or_decrease(&mut self, id: NodeId, pos: Point, priority: f32) -> bool {
        let seq = match self.live.get_mut(&pos) {
            Some(live) => {
                if priority >= live.priority {
                    return false;
                }
                live.priority = priority;
                live.id = id;
                live.seq
            }
            None => {
                let seq = self.seq;
                self.seq += 1;
                self.live.insert(pos, Live { id, priority, seq });
                seq
            }
        };
        self.heap.push(Reverse(HeapEntry { priority, seq, pos }));
        true
    }

    /// Remove and return the entry with the lowest priority. Ties go to the
    /// coordinate inserted first.
    pub fn try_pop(&mut self) -> Option<NodeId> {
        self.pop_live().map(|e| e.id)
    }

    fn pop_live(&mut self) -> Option<FrontierEntry> {
        while let Some(Reverse(entry)) = self.heap.pop() {
            let Some(live) = self.live.get(&entry.pos) else {
                continue;
            };
            // Skip stale entries.
            if live.seq != entry.seq || live.priority.to_bits() != entry.priority.to_bits() {
                continue;
            }
            let live = *live;
            self.live.remove(&entry.pos);
            return Some(FrontierEntry {
                id: live.id,
                position: entry.pos,
                priority: live.priority,
            });
        }
        None
    }

    /// Whether `pos` currently has an entry.
    #[inline]
    pub fn contains(&self, pos: Point) -> bool {
        self.live.contains_key(&pos)
    }

    /// Current priority of `pos`, if present.
    #[inline]
    pub fn priority_of(&self, pos: Point) -> Option<f32> {
        self.live.get(&pos).map(|l| l.priority)
    }

    /// Number of distinct entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether the frontier is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Copy of the current entries in pop order. Does not touch the queue.
    pub fn snapshot(&self) -> Vec<FrontierEntry> {
        let mut entries: Vec<_> = self.live.iter().map(|(&pos, &live)| (pos, live)).collect();
        entries.sort_by(|a, b| {
            a.1.priority
                .total_cmp(&b.1.priority)
                .then(a.1.seq.cmp(&b.1.seq))
        });
        entries
            .into_iter()
            .map(|(position, live)| FrontierEntry {
                id: live.id,
                position,
                priority: live.priority,
            })
            .collect()
    }

    /// The lowest-priority entry among those accepted by `filter`, without
    /// removing it.
    pub fn min_where(&self, mut filter: impl FnMut(NodeId) -> bool) -> Option<FrontierEntry> {
        self.live
            .iter()
            .filter(|(_, live)| filter(live.id))
            .min_by(|a, b| {
                a.1.priority
                    .total_cmp(&b.1.priority)
                    .then(a.1.seq.cmp(&b.1.seq))
            })
            .map(|(&position, live)| FrontierEntry {
                id: live.id,
                position,
                priority: live.priority,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{NodeRegistry, Side};

    fn ids(n: i32) -> (NodeRegistry, Vec<NodeId>) {
        let mut reg = NodeRegistry::default();
        let ids = (0..n)
            .map(|x| reg.get_or_create(Point::new(x, 0), Point::ZERO, Side::Start))
            .collect();
        (reg, ids)
    }

    #[test]
    fn pops_in_priority_order() {
        let (_, ids) = ids(3);
        let mut fr = Frontier::new();
        fr.insert_or_decrease(ids[0], Point::new(0, 0), 5.0);
        fr.insert_or_decrease(ids[1], Point::new(1, 0), 1.0);
        fr.insert_or_decrease(ids[2], Point::new(2, 0), 3.0);
        assert_eq!(fr.try_pop(), Some(ids[1]));
        assert_eq!(fr.try_pop(), Some(ids[2]));
        assert_eq!(fr.try_pop(), Some(ids[0]));
        assert_eq!(fr.try_pop(), None);
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let (_, ids) = ids(3);
        let mut fr = Frontier::new();
        fr.insert_or_decrease(ids[2], Point::new(2, 0), 2.0);
        fr.insert_or_decrease(ids[0], Point::new(0, 0), 2.0);
        fr.insert_or_decrease(ids[1], Point::new(1, 0), 2.0);
        assert_eq!(fr.try_pop(), Some(ids[2]));
        assert_eq!(fr.try_pop(), Some(ids[0]));
        assert_eq!(fr.try_pop(), Some(ids[1]));
    }

    #[test]
    fn decrease_updates_in_place() {
        let (_, ids) = ids(2);
        let mut fr = Frontier::new();
        let p0 = Point::new(0, 0);
        assert!(fr.insert_or_decrease(ids[0], p0, 4.0));
        fr.insert_or_decrease(ids[1], Point::new(1, 0), 3.0);
        assert!(fr.insert_or_decrease(ids[0], p0, 2.0));
        assert_eq!(fr.len(), 2);
        assert_eq!(fr.priority_of(p0), Some(2.0));
        assert_eq!(fr.try_pop(), Some(ids[0]));
        assert_eq!(fr.try_pop(), Some(ids[1]));
        // the stale 4.0 entry must not resurface
        assert_eq!(fr.try_pop(), None);
        assert!(fr.is_empty());
    }

    #[test]
    fn equal_or_higher_priority_is_a_no_op() {
        let (_, ids) = ids(1);
        let mut fr = Frontier::new();
        let p = Point::new(0, 0);
        fr.insert_or_decrease(ids[0], p, 2.0);
        assert!(!fr.insert_or_decrease(ids[0], p, 2.0));
        assert!(!fr.insert_or_decrease(ids[0], p, 7.0));
        assert_eq!(fr.priority_of(p), Some(2.0));
        assert_eq!(fr.len(), 1);
    }

    #[test]
    fn reinsert_after_pop() {
        let (_, ids) = ids(1);
        let mut fr = Frontier::new();
        let p = Point::new(0, 0);
        fr.insert_or_decrease(ids[0], p, 3.0);
        assert_eq!(fr.try_pop(), Some(ids[0]));
        assert!(!fr.contains(p));
        fr.insert_or_decrease(ids[0], p, 9.0);
        assert!(fr.contains(p));
        assert_eq!(fr.try_pop(), Some(ids[0]));
        assert_eq!(fr.try_pop(), None);
    }

    #[test]
    fn snapshot_is_ordered_and_non_destructive() {
        let (_, ids) = ids(3);
        let mut fr = Frontier::new();
        fr.insert_or_decrease(ids[0], Point::new(0, 0), 3.0);
        fr.insert_or_decrease(ids[1], Point::new(1, 0), 1.0);
        fr.insert_or_decrease(ids[2], Point::new(2, 0), 2.0);
        let snap = fr.snapshot();
        let order: Vec<_> = snap.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![ids[1], ids[2], ids[0]]);
        assert_eq!(fr.len(), 3);
    }

    #[test]
    fn min_where_filters() {
        let (_, ids) = ids(3);
        let mut fr = Frontier::new();
        fr.insert_or_decrease(ids[0], Point::new(0, 0), 1.0);
        fr.insert_or_decrease(ids[1], Point::new(1, 0), 5.0);
        fr.insert_or_decrease(ids[2], Point::new(2, 0), 3.0);
        let best = fr.min_where(|id| id != ids[0]).unwrap();
        assert_eq!(best.id, ids[2]);
        assert_eq!(best.priority, 3.0);
        assert!(fr.min_where(|_| false).is_none());
        assert_eq!(fr.len(), 3);
    }
}
