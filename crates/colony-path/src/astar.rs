//! Search trait and the default parallel A* implementation.
//!
//! # Pluggability
//!
//! [`PathfinderSystem`][crate::PathfinderSystem] calls search through the
//! [`PathSearch`] trait, so a different algorithm can be dropped in without
//! touching the service.  [`AStar`] is the default.
//!
//! # Concurrency inside one search
//!
//! g-scores, predecessor links and the closed set live in concurrent maps.
//! When a node has more neighbours than
//! [`PathfindingConfig::parallel_neighbor_threshold`] they are relaxed in
//! parallel.  Each relaxation compares and updates the neighbour's g-score
//! under that entry's lock, and re-queues it under the single open-set mutex
//! while still holding the entry.  Lock order is always g-score entry, then
//! open set.
//!
//! # Edge cases
//!
//! * `start == destination` returns `[start]` without searching.
//! * A blocked destination is swapped for the first unblocked of its four
//!   axis-aligned neighbours (left, up, right, down).  If all four are
//!   blocked or outside the grid the request is unreachable, even if some
//!   other nearby cell could be reached.
//! * The start node may itself be blocked; searching never enters a blocked
//!   node after it.
//! * Costs that change mid-search are read when a node is relaxed.  Closed
//!   nodes are never reopened, so such a path may be suboptimal but is always
//!   a valid walk over the graph.

use colony_core::Coord;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use rayon::prelude::*;
use rustc_hash::FxBuildHasher;

use crate::graph::GridGraph;
use crate::queue::IndexedPriorityQueue;
use crate::{PathError, PathfindingConfig, PathfindingResult};

// ── PathSearch trait ──────────────────────────────────────────────────────────

/// Pluggable point-to-point search.
///
/// # Thread safety
///
/// The pathfinding service runs many searches at once on rayon workers, so
/// implementations must be `Send + Sync`.
pub trait PathSearch: Send + Sync {
    /// Ordered node sequence from `start` to the (possibly substituted)
    /// destination, both ends included.
    fn search(&self, graph: &GridGraph, start: Coord, destination: Coord)
    -> PathfindingResult<Vec<Coord>>;
}

/// Parallel A* with a Manhattan heuristic.
#[derive(Clone, Debug, Default)]
pub struct AStar {
    pub config: PathfindingConfig,
}

impl AStar {
    pub fn new(config: PathfindingConfig) -> Self {
        Self { config }
    }
}

impl PathSearch for AStar {
    fn search(
        &self,
        graph: &GridGraph,
        start: Coord,
        destination: Coord,
    ) -> PathfindingResult<Vec<Coord>> {
        find_path(graph, start, destination, &self.config)
    }
}

// ── Entry points ──────────────────────────────────────────────────────────────

pub fn find_path(
    graph: &GridGraph,
    start: Coord,
    destination: Coord,
    config: &PathfindingConfig,
) -> PathfindingResult<Vec<Coord>> {
    find_path_traced(graph, start, destination, config, |_, _| {})
}

/// [`find_path`], reporting every node popped from the open set with its
/// f-score, in pop order.
pub fn find_path_traced(
    graph: &GridGraph,
    start: Coord,
    destination: Coord,
    config: &PathfindingConfig,
    mut on_pop: impl FnMut(Coord, u32),
) -> PathfindingResult<Vec<Coord>> {
    let start_node = graph.try_node(start)?;
    graph.try_node(destination)?;

    if start == destination {
        return Ok(vec![start]);
    }

    let unreachable = PathError::Unreachable { from: start, to: destination };
    let goal = effective_destination(graph, destination).ok_or(unreachable)?;
    if goal == start {
        return Ok(vec![start]);
    }

    let search = Search {
        graph,
        goal,
        g_score: DashMap::with_hasher(FxBuildHasher),
        came_from: DashMap::with_hasher(FxBuildHasher),
        closed: DashSet::with_hasher(FxBuildHasher),
        open: Mutex::new(IndexedPriorityQueue::with_capacity(config.initial_queue_capacity)),
    };

    let start_g = start_node.cost();
    search.g_score.insert(start, start_g);
    search.requeue(start, start_g);

    loop {
        // Bind first so the open-set guard drops before expansion.
        let popped = search.open.lock().dequeue();
        let Some((current, f)) = popped else { break };
        on_pop(current, f);
        tracing::trace!(node = %current, f, "popped");

        if current == goal {
            return Ok(search.reconstruct(start));
        }
        search.closed.insert(current);

        let Some(node) = graph.node(current) else { continue };
        let neighbors = node.neighbors();
        if neighbors.len() > config.parallel_neighbor_threshold {
            neighbors.par_iter().for_each(|&n| search.relax(current, n));
        } else {
            for &n in neighbors {
                search.relax(current, n);
            }
        }
    }

    tracing::trace!(from = %start, to = %destination, "open set exhausted");
    Err(PathError::Unreachable { from: start, to: destination })
}

/// `destination` if it is open, else the first open axis-aligned neighbour.
fn effective_destination(graph: &GridGraph, destination: Coord) -> Option<Coord> {
    if !graph.is_blocked(destination) {
        return Some(destination);
    }
    [(-1, 0), (0, -1), (1, 0), (0, 1)]
        .into_iter()
        .map(|(dx, dy)| destination.offset(dx, dy))
        .find(|&c| !graph.is_blocked(c))
}

// ── Search state ──────────────────────────────────────────────────────────────

struct Search<'g> {
    graph:     &'g GridGraph,
    goal:      Coord,
    g_score:   DashMap<Coord, u32, FxBuildHasher>,
    came_from: DashMap<Coord, Coord, FxBuildHasher>,
    closed:    DashSet<Coord, FxBuildHasher>,
    open:      Mutex<IndexedPriorityQueue<Coord>>,
}

impl Search<'_> {
    fn relax(&self, current: Coord, neighbor: Coord) {
        if self.closed.contains(&neighbor) {
            return;
        }
        let Some(node) = self.graph.node(neighbor) else { return };
        if node.is_blocked() {
            return;
        }
        let Some(current_g) = self.g_score.get(&current).map(|g| *g) else { return };
        let tentative = current_g.saturating_add(self.graph.step_cost(current, neighbor));

        let improved = match self.g_score.entry(neighbor) {
            Entry::Occupied(mut e) if tentative < *e.get() => {
                e.insert(tentative);
                self.came_from.insert(neighbor, current);
                self.requeue(neighbor, tentative);
                true
            }
            Entry::Occupied(_) => false,
            Entry::Vacant(e) => {
                let _held = e.insert(tentative);
                self.came_from.insert(neighbor, current);
                self.requeue(neighbor, tentative);
                true
            }
        };
        if improved {
            tracing::trace!(node = %neighbor, g = tentative, "relaxed");
        }
    }

    fn requeue(&self, node: Coord, g: u32) {
        self.open.lock().enqueue(node, g.saturating_add(GridGraph::heuristic(node, self.goal)));
    }

    fn reconstruct(&self, start: Coord) -> Vec<Coord> {
        let mut path = vec![self.goal];
        let mut cursor = self.goal;
        // Predecessor links form a tree rooted at `start`; the bound only
        // guards against a corrupted map.
        for _ in 0..self.graph.node_count() {
            if cursor == start {
                break;
            }
            match self.came_from.get(&cursor) {
                Some(prev) => {
                    cursor = *prev;
                    path.push(cursor);
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}
