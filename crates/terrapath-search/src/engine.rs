//! Bidirectional A* over a [`SpeedMap`].
//!
//! Two searches run in lock-step, one rooted at the start coordinate and one
//! rooted at the end coordinate. Each iteration pops one node from each
//! frontier. Nodes belong to the side that discovered them first; when a
//! side relaxes into a node owned by the other side it records a *contact*
//! in its own frontier, prioritised by the exact cost of the joined route.
//! The searches have met as soon as a popped node is a contact, either
//! because it is owned by the other side or because the other side's
//! frontier also holds it. The two half-chains are then spliced at the
//! cheapest joining edge.
//!
//! Costs are measured in travel direction: the start side pays for entering
//! each neighbor, the end side pays for entering the node it expands from,
//! so an end-side `g` is the cost of walking from the node to the end.

use log::{debug, error, info, trace};
use terrapath_core::field::is_valid_speed;
use terrapath_core::{CostField, Point};

use crate::chain::Chain;
use crate::config::{SearchConfig, SpeedPolicy};
use crate::error::{Result, SearchError};
use crate::frontier::Frontier;
use crate::neighbors::Neighbors;
use crate::outcome::{Path, PathOutcome, SearchStatus};
use crate::registry::{NodeId, NodeRegistry, Side};
use crate::snapshot::{FrontierNode, SearchSnapshot};
use crate::traits::SpeedMap;

/// Lifecycle of a [`SearchEngine`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, no iteration run yet.
    Init,
    /// At least one iteration has run.
    Running,
    /// Terminal with the given status.
    Finished(SearchStatus),
    /// Aborted by an internal invariant violation.
    Failed,
}

impl EngineState {
    /// Whether no further iterations will run.
    pub fn is_terminal(self) -> bool {
        matches!(self, EngineState::Finished(_) | EngineState::Failed)
    }
}

/// The cheapest edge joining a start-owned node to an end-owned node.
#[derive(Copy, Clone, Debug)]
struct Join {
    start_side: NodeId,
    end_side: NodeId,
    /// Cost of stepping from `start_side` into `end_side`.
    step_cost: f32,
}

/// Whether a search may step onto `p`. Cells slower than
/// [`MIN_SPEED`](terrapath_core::MIN_SPEED) count as walls, so every edge cost
/// stays finite.
#[inline]
fn passable<M: SpeedMap>(map: &M, p: Point) -> bool {
    map.is_traversable(p) && map.speed(p).is_some_and(is_valid_speed)
}

/// One start→end query. Construct it, then drive it with [`step`] or
/// [`run_to_completion`], or hand it to [`PathSearch`] to run on a worker.
///
/// [`step`]: SearchEngine::step
/// [`run_to_completion`]: SearchEngine::run_to_completion
/// [`PathSearch`]: crate::PathSearch
pub struct SearchEngine<M = CostField> {
    map: M,
    config: SearchConfig,
    start: Point,
    end: Point,
    registry: NodeRegistry,
    start_frontier: Frontier,
    end_frontier: Frontier,
    start_anchor: NodeId,
    end_anchor: NodeId,
    state: EngineState,
    outcome: Option<PathOutcome>,
    iterations: u64,
    current_start: Option<NodeId>,
    current_end: Option<NodeId>,
    neighbors: Neighbors,
}

impl<M: SpeedMap> SearchEngine<M> {
    /// Prepare a search with the default configuration.
    pub fn new(start: Point, end: Point, map: M) -> Result<Self> {
        Self::with_config(start, end, map, SearchConfig::default())
    }

    /// Prepare a search.
    ///
    /// Endpoints outside the map are rejected with
    /// [`SearchError::OutOfBounds`]. An impassable endpoint (including one
    /// slower than [`MIN_SPEED`](terrapath_core::MIN_SPEED)), or
    /// `start == end`, yields an engine that is already terminal.
    pub fn with_config(start: Point, end: Point, map: M, config: SearchConfig) -> Result<Self> {
        let bounds = map.bounds();
        for point in [start, end] {
            if !bounds.contains(point) {
                return Err(SearchError::OutOfBounds { point, bounds });
            }
        }

        let scale = match config.speed_policy {
            SpeedPolicy::Clamp => 1.0,
            SpeedPolicy::ScaleHeuristic => 1.0 / map.max_speed().max(1.0),
        };
        let mut registry = NodeRegistry::new(scale);
        let start_anchor = registry.get_or_create(start, end, Side::Start);
        registry.node_mut(start_anchor).g = 0.0;
        let end_anchor = registry.get_or_create(end, start, Side::End);
        registry.node_mut(end_anchor).g = 0.0;

        let mut start_frontier = Frontier::new();
        start_frontier.insert_or_decrease(start_anchor, start, registry.node(start_anchor).f());
        let mut end_frontier = Frontier::new();
        end_frontier.insert_or_decrease(end_anchor, end, registry.node(end_anchor).f());

        let outcome = if !passable(&map, start) {
            debug!("search {start} -> {end}: start is not traversable");
            Some(PathOutcome::failed(SearchStatus::StartBlocked))
        } else if !passable(&map, end) {
            debug!("search {start} -> {end}: end is not traversable");
            Some(PathOutcome::failed(SearchStatus::EndBlocked))
        } else if start == end {
            Some(PathOutcome::found(Path::new(vec![start], 0.0)))
        } else {
            None
        };
        let state = match &outcome {
            Some(o) => EngineState::Finished(o.status()),
            None => EngineState::Init,
        };
        debug!(
            "search {start} -> {end} prepared on {} ({:?}, heuristic scale {scale})",
            bounds, config.speed_policy
        );

        Ok(Self {
            map,
            config,
            start,
            end,
            registry,
            start_frontier,
            end_frontier,
            start_anchor,
            end_anchor,
            state,
            outcome,
            iterations: 0,
            current_start: None,
            current_end: None,
            neighbors: Neighbors::new(),
        })
    }

    #[inline]
    pub fn start(&self) -> Point {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Point {
        self.end
    }

    #[inline]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Completed main-loop iterations.
    #[inline]
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// The map being searched.
    #[inline]
    pub fn map(&self) -> &M {
        &self.map
    }

    #[inline]
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// The frontier of one side.
    #[inline]
    pub fn frontier(&self, side: Side) -> &Frontier {
        match side {
            Side::Start => &self.start_frontier,
            Side::End => &self.end_frontier,
        }
    }

    #[inline]
    fn frontier_mut(&mut self, side: Side) -> &mut Frontier {
        match side {
            Side::Start => &mut self.start_frontier,
            Side::End => &mut self.end_frontier,
        }
    }

    /// The terminal outcome, once reached.
    pub fn outcome(&self) -> Option<&PathOutcome> {
        self.outcome.as_ref()
    }

    /// Run one main-loop iteration.
    ///
    /// Returns `Ok(Some(_))` once the search is terminal (repeated calls
    /// return the same outcome) and `Ok(None)` while it is still running.
    pub fn step(&mut self) -> Result<Option<PathOutcome>> {
        match self.state {
            EngineState::Finished(_) => return Ok(self.outcome.clone()),
            EngineState::Failed => {
                return Err(SearchError::Invariant(
                    "search was aborted by an earlier failure".into(),
                ));
            }
            EngineState::Init => self.state = EngineState::Running,
            EngineState::Running => {}
        }

        match self.iterate() {
            Ok(Some(outcome)) => {
                self.finish(outcome.clone());
                Ok(Some(outcome))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                error!("search {} -> {} aborted: {e}", self.start, self.end);
                self.state = EngineState::Failed;
                Err(e)
            }
        }
    }

    /// Iterate until the search is terminal.
    pub fn run_to_completion(&mut self) -> Result<PathOutcome> {
        loop {
            if let Some(outcome) = self.step()? {
                return Ok(outcome);
            }
        }
    }

    fn finish(&mut self, outcome: PathOutcome) {
        match outcome.path() {
            Some(path) => info!(
                "search {} -> {} finished after {} iterations: {outcome}, cost {:.3}",
                self.start,
                self.end,
                self.iterations,
                path.cost()
            ),
            None => info!(
                "search {} -> {} finished after {} iterations: {outcome}",
                self.start, self.end, self.iterations
            ),
        }
        self.state = EngineState::Finished(outcome.status());
        self.outcome = Some(outcome);
    }

    fn iterate(&mut self) -> Result<Option<PathOutcome>> {
        if self.start_frontier.is_empty() || self.end_frontier.is_empty() {
            return self.resolve_exhaustion().map(Some);
        }
        let (Some(cur_start), Some(cur_end)) =
            (self.start_frontier.try_pop(), self.end_frontier.try_pop())
        else {
            return Err(SearchError::Invariant(
                "non-empty frontier yielded no entry".into(),
            ));
        };
        self.current_start = Some(cur_start);
        self.current_end = Some(cur_end);
        self.iterations += 1;

        let start_pos = self.registry.node(cur_start).position();
        let end_pos = self.registry.node(cur_end).position();
        trace!(
            "iteration {}: start side at {start_pos}, end side at {end_pos}",
            self.iterations
        );

        // The start side reached an end-owned node (the end anchor included).
        if self.registry.node(cur_start).origin() == Side::End {
            return self.meet(cur_start, Side::Start).map(Some);
        }
        // The end side reached a start-owned node (the start anchor included).
        if self.registry.node(cur_end).origin() == Side::Start {
            return self.meet(cur_end, Side::End).map(Some);
        }
        // The end side already touched the start side's node.
        if let Some(priority) = self.end_frontier.priority_of(start_pos) {
            trace!("{start_pos} is queued as a contact at {priority:.3}");
            return self.meet(cur_start, Side::End).map(Some);
        }
        if let Some(priority) = self.start_frontier.priority_of(end_pos) {
            trace!("{end_pos} is queued as a contact at {priority:.3}");
            return self.meet(cur_end, Side::Start).map(Some);
        }

        self.relax(cur_start, Side::Start);
        self.relax(cur_end, Side::End);
        self.registry.node_mut(cur_start).closed = true;
        self.registry.node_mut(cur_end).closed = true;
        Ok(None)
    }

    /// A frontier ran dry. Any contact still queued on the other side means
    /// the searches did meet; otherwise the endpoints are disconnected.
    fn resolve_exhaustion(&mut self) -> Result<PathOutcome> {
        for side in [Side::Start, Side::End] {
            let registry = &self.registry;
            let pending = self
                .frontier(side)
                .min_where(|id| registry.node(id).origin() != side);
            if let Some(entry) = pending {
                debug!(
                    "{} frontier is empty; joining at queued contact {}",
                    side.opposite(),
                    entry.position
                );
                return self.meet(entry.id, side);
            }
        }
        Ok(PathOutcome::failed(SearchStatus::FrontierExhausted))
    }

    /// Splice the two half-searches at `node`, pairing it with its cheapest
    /// neighbor owned by `partner`. `node` must be owned by the other side.
    fn meet(&mut self, node: NodeId, partner: Side) -> Result<PathOutcome> {
        let join = self.best_join(node, partner)?;
        let start_chain = Chain::trace(&self.registry, join.start_side)?;
        let end_chain = Chain::trace(&self.registry, join.end_side)?;
        let path = start_chain
            .appended(end_chain.reversed(), join.step_cost)
            .into_path();
        trace!(
            "searches met between {} and {}",
            self.registry.node(join.start_side).position(),
            self.registry.node(join.end_side).position()
        );
        Ok(PathOutcome::found(path))
    }

    fn best_join(&mut self, node: NodeId, partner: Side) -> Result<Join> {
        let pos = self.registry.node(node).position();
        let node_g = self.registry.node(node).g;
        if !self.registry.node(node).is_reached() {
            return Err(SearchError::Invariant(format!(
                "searches met at {pos}, which its own side never reached"
            )));
        }
        let mut best: Option<(f32, Join)> = None;

        let mut nbuf = std::mem::take(&mut self.neighbors);
        for step in nbuf.all(pos, |p| passable(&self.map, p)) {
            let Some(other) = self.registry.find(step.to) else {
                continue;
            };
            let other_node = self.registry.node(other);
            if other_node.origin() != partner || !other_node.is_reached() {
                continue;
            }
            let (start_side, end_side, entered) = match partner {
                Side::Start => (other, node, pos),
                Side::End => (node, other, step.to),
            };
            let step_cost = step.length / self.entry_speed(entered);
            let total = other_node.g + step_cost + node_g;
            if best.as_ref().is_none_or(|(b, _)| total < *b) {
                best = Some((
                    total,
                    Join {
                        start_side,
                        end_side,
                        step_cost,
                    },
                ));
            }
        }
        self.neighbors = nbuf;

        best.map(|(_, join)| join).ok_or_else(|| {
            SearchError::Invariant(format!(
                "searches met at {pos} but it has no {partner}-side neighbor"
            ))
        })
    }

    /// Relax the eight neighbors of `cur` on behalf of `side`.
    fn relax(&mut self, cur: NodeId, side: Side) {
        let pos = self.registry.node(cur).position();
        let g = self.registry.node(cur).g;
        let target = match side {
            Side::Start => self.end,
            Side::End => self.start,
        };
        let cur_speed = self.entry_speed(pos);

        let mut nbuf = std::mem::take(&mut self.neighbors);
        for step in nbuf.all(pos, |p| passable(&self.map, p)) {
            let entered = match side {
                Side::Start => self.entry_speed(step.to),
                Side::End => cur_speed,
            };
            let edge = step.length / entered;
            if !edge.is_finite() {
                continue;
            }
            let id = self.registry.get_or_create(step.to, target, side);
            let neighbor = self.registry.node(id);
            if neighbor.closed {
                continue;
            }
            if neighbor.origin() == side {
                let candidate = g + edge;
                if candidate < neighbor.g {
                    let n = self.registry.node_mut(id);
                    n.g = candidate;
                    n.parent = Some(cur);
                    let f = n.f();
                    self.frontier_mut(side).insert_or_decrease(id, step.to, f);
                }
            } else if neighbor.is_reached() {
                // Contact with the other search: queue the full joined cost.
                let total = g + edge + neighbor.g;
                self.frontier_mut(side).insert_or_decrease(id, step.to, total);
            }
        }
        self.neighbors = nbuf;
    }

    /// Speed used when entering `p`, after applying the speed policy.
    #[inline]
    fn entry_speed(&self, p: Point) -> f32 {
        let speed = self.map.speed(p).unwrap_or(0.0);
        match self.config.speed_policy {
            SpeedPolicy::Clamp => speed.min(1.0),
            SpeedPolicy::ScaleHeuristic => speed,
        }
    }

    /// Copy of both frontiers and the most recently popped nodes.
    pub fn snapshot(&self) -> SearchSnapshot {
        let copy = |frontier: &Frontier| -> Vec<FrontierNode> {
            frontier
                .snapshot()
                .into_iter()
                .map(|e| {
                    let node = self.registry.node(e.id);
                    FrontierNode {
                        position: e.position,
                        priority: e.priority,
                        g: node.g,
                        origin: node.origin(),
                    }
                })
                .collect()
        };
        SearchSnapshot {
            iteration: self.iterations,
            current_start: self.current_start.map(|id| self.registry.node(id).position()),
            current_end: self.current_end.map(|id| self.registry.node(id).position()),
            start_frontier: copy(&self.start_frontier),
            end_frontier: copy(&self.end_frontier),
        }
    }

    /// Node id of one side's anchor.
    #[inline]
    pub fn anchor(&self, side: Side) -> NodeId {
        match side {
            Side::Start => self.start_anchor,
            Side::End => self.end_anchor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrapath_core::{MIN_SPEED, Range};

    const EPS: f32 = 1e-4;
    const SQRT_2: f32 = std::f32::consts::SQRT_2;

    /// `.` = 1.0, `,` = 0.5, `~` = 0.25, `#` = impassable, `+` = 2.0.
    fn field(rows: &[&str]) -> CostField {
        CostField::from_rows(
            rows.iter()
                .map(|r| {
                    r.chars()
                        .map(|c| match c {
                            '#' => 0.0,
                            ',' => 0.5,
                            '~' => 0.25,
                            '+' => 2.0,
                            _ => 1.0,
                        })
                        .collect::<Vec<f32>>()
                })
                .collect(),
        )
        .unwrap()
    }

    fn solve(start: Point, end: Point, map: CostField) -> PathOutcome {
        SearchEngine::new(start, end, map)
            .unwrap()
            .run_to_completion()
            .unwrap()
    }

    fn walk_cost(map: &CostField, points: &[Point]) -> f32 {
        points
            .windows(2)
            .map(|w| {
                let diagonal = w[0].x != w[1].x && w[0].y != w[1].y;
                let len = if diagonal { SQRT_2 } else { 1.0 };
                len / map.speed_at(w[1]).min(1.0)
            })
            .sum()
    }

    fn assert_valid(outcome: &PathOutcome, start: Point, end: Point) {
        assert_eq!(outcome.status(), SearchStatus::PathFound);
        let path = outcome.path().unwrap();
        assert_eq!(path.start(), Some(start));
        assert_eq!(path.end(), Some(end));
        assert!(path.is_contiguous(), "{:?}", path.points());
    }

    #[test]
    fn diagonal_on_open_3x3() {
        let map = field(&["...", "...", "..."]);
        let (s, e) = (Point::new(0, 0), Point::new(2, 2));
        let outcome = solve(s, e, map);
        assert_valid(&outcome, s, e);
        let path = outcome.path().unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.points()[1], Point::new(1, 1));
        assert!((path.cost() - 2.0 * SQRT_2).abs() < EPS);
    }

    #[test]
    fn detour_around_blocked_center() {
        let map = field(&["...", ".#.", "..."]);
        let (s, e) = (Point::new(0, 0), Point::new(2, 2));
        let outcome = solve(s, e, map.clone());
        assert_valid(&outcome, s, e);
        let path = outcome.path().unwrap();
        assert!(path.len() >= 4);
        assert!(!path.points().contains(&Point::new(1, 1)));
        assert!((path.cost() - walk_cost(&map, path.points())).abs() < EPS);
        assert!((path.cost() - (2.0 + SQRT_2)).abs() < EPS);
    }

    #[test]
    fn wall_without_gap_exhausts() {
        let map = field(&[".#.", ".#.", ".#."]);
        let outcome = solve(Point::new(0, 0), Point::new(2, 2), map);
        assert_eq!(outcome.status(), SearchStatus::FrontierExhausted);
        assert!(outcome.path().is_none());
    }

    #[test]
    fn single_connector_blocked_exhausts() {
        // (1,1) would be the only link between the two pockets.
        let map = field(&[".##", "###", "##."]);
        let outcome = solve(Point::new(0, 0), Point::new(2, 2), map);
        assert_eq!(outcome.status(), SearchStatus::FrontierExhausted);
    }

    #[test]
    fn start_equals_end() {
        let map = field(&["..", ".."]);
        let p = Point::new(1, 0);
        let mut engine = SearchEngine::new(p, p, map).unwrap();
        assert_eq!(engine.state(), EngineState::Finished(SearchStatus::PathFound));
        let outcome = engine.run_to_completion().unwrap();
        let path = outcome.path().unwrap();
        assert_eq!(path.points(), &[p]);
        assert_eq!(path.cost(), 0.0);
        assert_eq!(engine.registry().len(), 1);
        assert_eq!(engine.iterations(), 0);
    }

    #[test]
    fn blocked_start_does_no_work() {
        let map = field(&["#..", "...", "..."]);
        let mut engine = SearchEngine::new(Point::new(0, 0), Point::new(2, 2), map).unwrap();
        assert_eq!(
            engine.state(),
            EngineState::Finished(SearchStatus::StartBlocked)
        );
        let outcome = engine.run_to_completion().unwrap();
        assert_eq!(outcome.status(), SearchStatus::StartBlocked);
        assert_eq!(engine.iterations(), 0);
        assert_eq!(engine.registry().len(), 2);
        assert_eq!(engine.frontier(Side::Start).len(), 1);
        assert_eq!(engine.frontier(Side::End).len(), 1);
    }

    #[test]
    fn blocked_end() {
        let map = field(&["...", "...", "..#"]);
        let outcome = solve(Point::new(0, 0), Point::new(2, 2), map);
        assert_eq!(outcome.status(), SearchStatus::EndBlocked);
        assert!(outcome.path().is_none());
    }

    #[test]
    fn both_blocked_reports_start_first() {
        let map = field(&["#.#"]);
        let outcome = solve(Point::new(0, 0), Point::new(2, 0), map);
        assert_eq!(outcome.status(), SearchStatus::StartBlocked);
    }

    #[test]
    fn out_of_bounds_endpoint_is_an_error() {
        let map = field(&["..", ".."]);
        let err = SearchEngine::new(Point::new(0, 0), Point::new(2, 0), map)
            .err()
            .unwrap();
        match err {
            SearchError::OutOfBounds { point, bounds } => {
                assert_eq!(point, Point::new(2, 0));
                assert_eq!(bounds, Range::new(0, 0, 2, 2));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn adjacent_endpoints() {
        let map = field(&[".."]);
        let (s, e) = (Point::new(0, 0), Point::new(1, 0));
        let outcome = solve(s, e, map);
        assert_valid(&outcome, s, e);
        assert_eq!(outcome.path().unwrap().len(), 2);
        assert!((outcome.path().unwrap().cost() - 1.0).abs() < EPS);
    }

    #[test]
    fn prefers_fast_terrain() {
        // The direct row is slow; going around through the fast rows is
        // cheaper.
        let map = field(&[
            ".......", //
            ".~~~~~.", //
            ".......",
        ]);
        let (s, e) = (Point::new(0, 1), Point::new(6, 1));
        let outcome = solve(s, e, map.clone());
        assert_valid(&outcome, s, e);
        let path = outcome.path().unwrap();
        assert!(
            path.points()[1..path.len() - 1]
                .iter()
                .all(|p| p.y != 1),
            "{:?}",
            path.points()
        );
        assert!((path.cost() - walk_cost(&map, path.points())).abs() < EPS);
    }

    #[test]
    fn costs_follow_travel_direction() {
        // Entering the slow end cell costs 1 / 0.5 = 2; leaving the slow
        // start cell costs nothing extra.
        let map = field(&[",.,"]);
        let outcome = solve(Point::new(0, 0), Point::new(2, 0), map);
        let path = outcome.path().unwrap();
        assert_eq!(path.len(), 3);
        assert!((path.cost() - 3.0).abs() < EPS);
    }

    #[test]
    fn winding_corridor() {
        let map = field(&[
            ".#.....", //
            ".#.###.", //
            ".#.#.#.", //
            ".#.#.#.", //
            "...#...",
        ]);
        let (s, e) = (Point::new(0, 0), Point::new(4, 2));
        let outcome = solve(s, e, map.clone());
        assert_valid(&outcome, s, e);
        let path = outcome.path().unwrap();
        assert!(path.points().iter().all(|&p| map.is_traversable(p)));
        assert!((path.cost() - walk_cost(&map, path.points())).abs() < EPS);
    }

    #[test]
    fn repeated_runs_agree() {
        let rows = [
            "..,,....", //
            ".#~~#..,",
            ".#..#.#.",
            "...,..#.",
        ];
        let (s, e) = (Point::new(0, 3), Point::new(7, 0));
        let a = solve(s, e, field(&rows));
        let b = solve(s, e, field(&rows));
        assert_eq!(a, b);
    }

    #[test]
    fn step_moves_through_states() {
        let map = field(&["....", "....", "...."]);
        let mut engine = SearchEngine::new(Point::new(0, 0), Point::new(3, 2), map).unwrap();
        assert_eq!(engine.state(), EngineState::Init);
        assert!(engine.step().unwrap().is_none());
        assert_eq!(engine.state(), EngineState::Running);
        let outcome = engine.run_to_completion().unwrap();
        assert_eq!(engine.state(), EngineState::Finished(SearchStatus::PathFound));
        // terminal engines keep answering with the same outcome
        assert_eq!(engine.step().unwrap(), Some(outcome));
    }

    #[test]
    fn closed_nodes_never_reopen() {
        let map = field(&["......", "..##..", "......"]);
        let mut engine = SearchEngine::new(Point::new(0, 1), Point::new(5, 1), map).unwrap();
        while engine.step().unwrap().is_none() {
            let registry = engine.registry();
            for side in [Side::Start, Side::End] {
                for entry in engine.frontier(side).snapshot() {
                    let node = registry.node(entry.id);
                    if node.origin() == side {
                        assert!(!node.closed, "{} re-queued after closing", entry.position);
                    }
                }
            }
        }
    }

    #[test]
    fn anchors_keep_zero_cost() {
        let map = field(&[".....", ".....", "....."]);
        let mut engine = SearchEngine::new(Point::new(0, 0), Point::new(4, 2), map).unwrap();
        engine.run_to_completion().unwrap();
        for side in [Side::Start, Side::End] {
            let anchor = engine.registry().node(engine.anchor(side));
            assert_eq!(anchor.g, 0.0);
            assert_eq!(anchor.parent, None);
        }
    }

    #[test]
    fn one_node_per_coordinate() {
        let map = field(&["........", "..#..#..", "........", "........"]);
        let mut engine = SearchEngine::new(Point::new(0, 0), Point::new(7, 3), map).unwrap();
        engine.run_to_completion().unwrap();
        let registry = engine.registry();
        let mut seen = std::collections::HashSet::new();
        for x in 0..8 {
            for y in 0..4 {
                if let Some(id) = registry.find(Point::new(x, y)) {
                    assert!(seen.insert(id));
                    assert_eq!(registry.node(id).position(), Point::new(x, y));
                }
            }
        }
        assert_eq!(seen.len(), registry.len());
    }

    #[test]
    fn missing_partner_is_an_invariant_violation() {
        let map = field(&["....", "...."]);
        let mut engine = SearchEngine::new(Point::new(0, 0), Point::new(3, 1), map).unwrap();
        // The start anchor has no end-side neighbor before any relaxation.
        let err = engine
            .meet(engine.anchor(Side::Start), Side::End)
            .unwrap_err();
        assert!(matches!(err, SearchError::Invariant(_)));
    }

    #[test]
    fn snapshot_copies_frontiers() {
        let map = field(&[".....", ".....", "....."]);
        let mut engine = SearchEngine::new(Point::new(0, 1), Point::new(4, 1), map).unwrap();
        let before = engine.snapshot();
        assert_eq!(before.iteration, 0);
        assert_eq!(before.start_frontier.len(), 1);
        assert_eq!(before.end_frontier.len(), 1);
        assert_eq!(before.current_start, None);

        engine.step().unwrap();
        let after = engine.snapshot();
        assert_eq!(after.iteration, 1);
        assert_eq!(after.current_start, Some(Point::new(0, 1)));
        assert_eq!(after.current_end, Some(Point::new(4, 1)));
        assert!(after.start_frontier.iter().all(|n| n.origin == Side::Start));
        assert!(after.end_frontier.iter().all(|n| n.origin == Side::End));
        let priorities: Vec<_> = after.start_frontier.iter().map(|n| n.priority).collect();
        assert!(priorities.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn clamp_policy_caps_fast_cells() {
        let map = field(&["+++"]);
        let outcome = solve(Point::new(0, 0), Point::new(2, 0), map);
        assert!((outcome.path().unwrap().cost() - 2.0).abs() < EPS);
    }

    #[test]
    fn scale_policy_uses_fast_cells() {
        let map = field(&["+++++", "....."]);
        let config = SearchConfig::default().with_speed_policy(SpeedPolicy::ScaleHeuristic);
        let mut engine =
            SearchEngine::with_config(Point::new(0, 0), Point::new(4, 0), map, config).unwrap();
        let outcome = engine.run_to_completion().unwrap();
        let path = outcome.path().unwrap();
        assert!((path.cost() - 2.0).abs() < EPS, "cost {}", path.cost());
        assert!(path.points().iter().all(|p| p.y == 0));
        let start = engine.registry().node(engine.anchor(Side::Start));
        assert!((start.h() - 2.0).abs() < EPS);
    }

    /// Row-major speeds with no validation, so tests can feed the engine
    /// values a [`CostField`] refuses.
    struct RawSpeeds {
        width: i32,
        speeds: Vec<f32>,
    }

    impl SpeedMap for RawSpeeds {
        fn bounds(&self) -> Range {
            Range::sized(self.width, self.speeds.len() as i32 / self.width)
        }

        fn speed(&self, p: Point) -> Option<f32> {
            self.bounds()
                .contains(p)
                .then(|| self.speeds[(p.y * self.width + p.x) as usize])
        }
    }

    #[test]
    fn crawling_cells_act_as_walls() {
        // The only route from (0, 0) to (6, 0) runs through the crawling
        // cell at (5, 0); row 2 reaches the end only through (6, 1).
        let mut speeds = vec![1.0, 1.0, 1.0, 1.0, 1.0, 1e-40, 1.0];
        speeds.extend([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        speeds.extend([1.0; 7]);
        let map = RawSpeeds { width: 7, speeds };
        let mut engine = SearchEngine::new(Point::new(0, 0), Point::new(6, 0), map).unwrap();
        let outcome = engine.run_to_completion().unwrap();
        assert_eq!(outcome.status(), SearchStatus::FrontierExhausted);
        assert!(outcome.path().is_none());
        assert_eq!(engine.registry().find(Point::new(5, 0)), None);
    }

    #[test]
    fn crawling_endpoints_are_blocked() {
        let map = RawSpeeds {
            width: 4,
            speeds: vec![1.0, 1.0, 1.0, 1e-40],
        };
        let outcome = SearchEngine::new(Point::new(0, 0), Point::new(3, 0), map)
            .unwrap()
            .run_to_completion()
            .unwrap();
        assert_eq!(outcome.status(), SearchStatus::EndBlocked);

        let map = RawSpeeds {
            width: 4,
            speeds: vec![1e-40, 1.0, 1.0, 1.0],
        };
        let engine = SearchEngine::new(Point::new(0, 0), Point::new(3, 0), map).unwrap();
        assert_eq!(
            engine.state(),
            EngineState::Finished(SearchStatus::StartBlocked)
        );
    }

    #[test]
    fn slowest_valid_end_still_connects() {
        let map = CostField::from_rows(vec![vec![1.0, 1.0, 1.0, MIN_SPEED]]).unwrap();
        let (s, e) = (Point::new(0, 0), Point::new(3, 0));
        let outcome = solve(s, e, map.clone());
        assert_valid(&outcome, s, e);
        let path = outcome.path().unwrap();
        assert!(path.cost().is_finite());
        assert!((path.cost() - (2.0 + 1.0 / MIN_SPEED)).abs() < 1.0);
        assert!((path.cost() - walk_cost(&map, path.points())).abs() < 1.0);
    }

    #[test]
    fn unreached_foreign_node_is_not_a_contact() {
        let map = field(&["....."]);
        let (s, e) = (Point::new(0, 0), Point::new(4, 0));
        let mut engine = SearchEngine::new(s, e, map).unwrap();
        // An end-side node the end search has not reached yet.
        let stray = engine
            .registry
            .get_or_create(Point::new(1, 0), s, Side::End);
        assert!(!engine.registry().node(stray).is_reached());

        engine.step().unwrap();
        assert!(!engine.frontier(Side::Start).contains(Point::new(1, 0)));
    }

    #[test]
    fn meeting_at_an_unreached_node_is_an_invariant_violation() {
        let map = field(&["....."]);
        let (s, e) = (Point::new(0, 0), Point::new(4, 0));
        let mut engine = SearchEngine::new(s, e, map).unwrap();
        let stray = engine
            .registry
            .get_or_create(Point::new(1, 0), s, Side::End);
        // (1, 0) touches the reached start anchor, but has no cost of its own.
        let err = engine.meet(stray, Side::Start).unwrap_err();
        assert!(matches!(err, SearchError::Invariant(_)), "{err}");
    }
}
