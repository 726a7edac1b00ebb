//! Navigation graph over a 2-D integer grid.
//!
//! # Layout
//!
//! Nodes are stored row-major in one `Vec<GraphNode>`; `Coord { x, y }` maps
//! to slot `y * width + x`.  Neighbour lists are explicit data fixed at build
//! time, so a graph may be 4-connected, 8-connected, or arbitrarily wired.
//!
//! # Mutation while searching
//!
//! A node's coordinate, type and neighbours are immutable once built.  Its
//! cost, blocked/occupied state, terrain and resource count are atomics and
//! may change at any time, including while searches are running over the
//! graph.  Searches read each value once when they need it and never assume
//! it is unchanged later.
//!
//! # Cost model
//!
//! Stepping from A to B costs `cost(A) + cost(B)`.  Node costs are clamped to
//! at least 1, so every step costs at least 2.  Links only ever join cells at
//! Manhattan distance 1 or 2, which keeps the Manhattan heuristic admissible
//! and consistent.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, AtomicU32, Ordering};

use colony_core::{Coord, GraphId};

use crate::{PathError, PathfindingResult};

// ── Node classification ───────────────────────────────────────────────────────

/// Base ground type, fixed at creation.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeType {
    #[default]
    Empty,
    Lake,
    Sand,
    Plains,
    Mountain,
}

impl NodeType {
    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

/// What currently stands on a node.  Changes as the colony builds and
/// harvests.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum NodeTerrain {
    #[default]
    Empty = 0,
    Mine,
    Tree,
    Lake,
    Stump,
    TownCenter,
    Construction,
    WatchTower,
    Mountain,
}

impl NodeTerrain {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => NodeTerrain::Mine,
            2 => NodeTerrain::Tree,
            3 => NodeTerrain::Lake,
            4 => NodeTerrain::Stump,
            5 => NodeTerrain::TownCenter,
            6 => NodeTerrain::Construction,
            7 => NodeTerrain::WatchTower,
            8 => NodeTerrain::Mountain,
            _ => NodeTerrain::Empty,
        }
    }

    /// Terrain that units walk up to rather than onto.
    pub fn is_obstacle(self) -> bool {
        matches!(
            self,
            NodeTerrain::Mine
                | NodeTerrain::Tree
                | NodeTerrain::Lake
                | NodeTerrain::TownCenter
                | NodeTerrain::WatchTower
                | NodeTerrain::Mountain
        )
    }
}

// ── TraversalRules ────────────────────────────────────────────────────────────

/// Per-[`NodeType`] base cost for one movement capability; `None` means the
/// type is impassable.
///
/// Giving each graph its own rules is how carts, gatherers and builders end
/// up with different navigable worlds over the same map.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraversalRules {
    costs: [Option<u32>; 5],
}

impl Default for TraversalRules {
    /// Lakes impassable; sand and mountains slower than open ground.
    fn default() -> Self {
        let mut rules = Self::uniform(1);
        rules.set(NodeType::Lake, None);
        rules.set(NodeType::Sand, Some(2));
        rules.set(NodeType::Mountain, Some(4));
        rules
    }
}

impl TraversalRules {
    /// Every type passable at `cost`.
    pub fn uniform(cost: u32) -> Self {
        Self { costs: [Some(cost.max(1)); 5] }
    }

    pub fn set(&mut self, node_type: NodeType, cost: Option<u32>) -> &mut Self {
        self.costs[node_type.slot()] = cost.map(|c| c.max(1));
        self
    }

    pub fn cost(&self, node_type: NodeType) -> Option<u32> {
        self.costs[node_type.slot()]
    }

    pub fn is_passable(&self, node_type: NodeType) -> bool {
        self.cost(node_type).is_some()
    }
}

// ── GraphNode ─────────────────────────────────────────────────────────────────

/// One grid cell.
pub struct GraphNode {
    coord:     Coord,
    node_type: NodeType,
    neighbors: Vec<Coord>,
    cost:      AtomicU32,
    blocked:   AtomicBool,
    occupied:  AtomicBool,
    terrain:   AtomicU8,
    resource:  AtomicI32,
}

impl GraphNode {
    pub(crate) fn new(coord: Coord, node_type: NodeType, cost: u32, neighbors: Vec<Coord>) -> Self {
        Self {
            coord,
            node_type,
            neighbors,
            cost: AtomicU32::new(cost.max(1)),
            blocked: AtomicBool::new(false),
            occupied: AtomicBool::new(false),
            terrain: AtomicU8::new(NodeTerrain::Empty as u8),
            resource: AtomicI32::new(0),
        }
    }

    #[inline]
    pub fn coord(&self) -> Coord {
        self.coord
    }

    #[inline]
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    #[inline]
    pub fn neighbors(&self) -> &[Coord] {
        &self.neighbors
    }

    pub fn is_neighbor(&self, other: Coord) -> bool {
        self.neighbors.contains(&other)
    }

    /// Cost of entering or leaving this node; always ≥ 1.
    #[inline]
    pub fn cost(&self) -> u32 {
        self.cost.load(Ordering::Relaxed)
    }

    /// Values below 1 are clamped to 1.  Path costs saturate at `u32::MAX`.
    pub fn set_cost(&self, cost: u32) {
        self.cost.store(cost.max(1), Ordering::Relaxed);
    }

    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::Relaxed)
    }

    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::Relaxed);
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied.load(Ordering::Relaxed)
    }

    pub fn set_occupied(&self, occupied: bool) {
        self.occupied.store(occupied, Ordering::Relaxed);
    }

    pub fn terrain(&self) -> NodeTerrain {
        NodeTerrain::from_u8(self.terrain.load(Ordering::Relaxed))
    }

    pub fn set_terrain(&self, terrain: NodeTerrain) {
        self.terrain.store(terrain as u8, Ordering::Relaxed);
    }

    pub fn resource(&self) -> i32 {
        self.resource.load(Ordering::Relaxed)
    }

    pub fn set_resource(&self, amount: i32) {
        self.resource.store(amount, Ordering::Relaxed);
    }

    /// Atomically take up to `amount` units, returning how many were taken.
    ///
    /// Concurrent takers never drive the count below zero.
    pub fn take_resource(&self, amount: i32) -> i32 {
        if amount <= 0 {
            return 0;
        }
        match self.resource.fetch_update(Ordering::AcqRel, Ordering::Acquire, |have| {
            (have > 0).then(|| have - have.min(amount))
        }) {
            Ok(before) => before.min(amount),
            Err(_) => 0,
        }
    }
}

impl fmt::Debug for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphNode")
            .field("coord", &self.coord)
            .field("node_type", &self.node_type)
            .field("cost", &self.cost())
            .field("blocked", &self.is_blocked())
            .field("terrain", &self.terrain())
            .field("neighbors", &self.neighbors.len())
            .finish()
    }
}

// ── GridGraph ─────────────────────────────────────────────────────────────────

/// Immutable-topology grid graph with mutable node state.
///
/// Build with [`GridGraphBuilder`][crate::GridGraphBuilder].
#[derive(Debug)]
pub struct GridGraph {
    pub(crate) id:     GraphId,
    pub(crate) width:  u32,
    pub(crate) height: u32,
    pub(crate) nodes:  Vec<GraphNode>,
}

impl GridGraph {
    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn in_bounds(&self, c: Coord) -> bool {
        c.x >= 0 && c.y >= 0 && (c.x as u32) < self.width && (c.y as u32) < self.height
    }

    #[inline]
    pub(crate) fn slot(&self, c: Coord) -> Option<usize> {
        self.in_bounds(c)
            .then(|| c.y as usize * self.width as usize + c.x as usize)
    }

    pub fn node(&self, c: Coord) -> Option<&GraphNode> {
        self.slot(c).map(|i| &self.nodes[i])
    }

    pub fn try_node(&self, c: Coord) -> PathfindingResult<&GraphNode> {
        self.node(c).ok_or(PathError::OutOfBounds(c))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }

    /// Out-of-bounds coordinates count as blocked.
    pub fn is_blocked(&self, c: Coord) -> bool {
        self.node(c).is_none_or(GraphNode::is_blocked)
    }

    /// Cost of moving from `from` to its neighbour `to`.
    ///
    /// # Panics
    ///
    /// If `to` is not in `from`'s neighbour list.  Asking for the cost of a
    /// non-existent edge means the caller or the graph is broken.
    pub fn step_cost(&self, from: Coord, to: Coord) -> u32 {
        match self.try_step_cost(from, to) {
            Ok(cost) => cost,
            Err(e) => panic!("step_cost: {e}"),
        }
    }

    /// Like [`step_cost`][Self::step_cost] but returns the violation.
    pub fn try_step_cost(&self, from: Coord, to: Coord) -> PathfindingResult<u32> {
        let a = self.try_node(from)?;
        let b = self.try_node(to)?;
        if !a.is_neighbor(to) {
            return Err(PathError::InvalidAdjacency { from, to });
        }
        Ok(a.cost().saturating_add(b.cost()))
    }

    /// Manhattan distance; the A* heuristic for this cost model.
    #[inline]
    pub fn heuristic(a: Coord, b: Coord) -> u32 {
        a.manhattan(b)
    }
}

// ── GridGraphBuilder ──────────────────────────────────────────────────────────

const FOUR: [(i32, i32); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];
const DIAGONALS: [(i32, i32); 4] = [(-1, -1), (1, -1), (1, 1), (-1, 1)];

pub(crate) struct NodeSpec {
    pub(crate) node_type: NodeType,
    pub(crate) cost:      Option<u32>,
    pub(crate) blocked:   bool,
    pub(crate) terrain:   NodeTerrain,
    pub(crate) resource:  i32,
    pub(crate) neighbors: Vec<Coord>,
}

/// Fluent builder for [`GridGraph`].
///
/// # Usage
///
/// ```rust
/// use colony_core::Coord;
/// use colony_path::GridGraphBuilder;
///
/// let graph = GridGraphBuilder::new(10, 10)
///     .four_connected()
///     .block(Coord::new(5, 5))
///     .build();
///
/// assert!(graph.is_blocked(Coord::new(5, 5)));
/// assert_eq!(graph.step_cost(Coord::new(0, 0), Coord::new(1, 0)), 2);
/// ```
pub struct GridGraphBuilder {
    pub(crate) id:     GraphId,
    pub(crate) width:  u32,
    pub(crate) height: u32,
    pub(crate) rules:  TraversalRules,
    pub(crate) specs:  Vec<NodeSpec>,
}

impl GridGraphBuilder {
    /// A `width × height` grid of unconnected plains.
    pub fn new(width: u32, height: u32) -> Self {
        let specs = (0..width as usize * height as usize)
            .map(|_| NodeSpec {
                node_type: NodeType::Plains,
                cost:      None,
                blocked:   false,
                terrain:   NodeTerrain::Empty,
                resource:  0,
                neighbors: Vec::new(),
            })
            .collect();
        Self { id: GraphId(0), width, height, rules: TraversalRules::default(), specs }
    }

    pub fn id(mut self, id: GraphId) -> Self {
        self.id = id;
        self
    }

    pub fn rules(mut self, rules: TraversalRules) -> Self {
        self.rules = rules;
        self
    }

    /// Link every cell to its in-bounds axis-aligned neighbours.
    pub fn four_connected(mut self) -> Self {
        self.wire(&FOUR);
        self
    }

    /// Link every cell to all eight surrounding cells.
    pub fn eight_connected(mut self) -> Self {
        self.wire(&FOUR);
        self.wire(&DIAGONALS);
        self
    }

    /// Add a two-way link between `a` and `b`.
    ///
    /// Links must span a Manhattan distance of 1 or 2.
    pub fn connect(mut self, a: Coord, b: Coord) -> Self {
        debug_assert!(
            (1..=2).contains(&a.manhattan(b)),
            "link {a} -> {b} breaks the heuristic bound"
        );
        if self.slot(a).is_some() && self.slot(b).is_some() {
            self.link(a, b);
            self.link(b, a);
        }
        self
    }

    pub fn node_type(mut self, c: Coord, node_type: NodeType) -> Self {
        if let Some(spec) = self.spec_mut(c) {
            spec.node_type = node_type;
        }
        self
    }

    pub fn block(mut self, c: Coord) -> Self {
        if let Some(spec) = self.spec_mut(c) {
            spec.blocked = true;
        }
        self
    }

    /// Override the rule-derived cost of one node.
    pub fn set_cost(mut self, c: Coord, cost: u32) -> Self {
        if let Some(spec) = self.spec_mut(c) {
            spec.cost = Some(cost);
        }
        self
    }

    pub fn terrain(mut self, c: Coord, terrain: NodeTerrain, resource: i32) -> Self {
        if let Some(spec) = self.spec_mut(c) {
            spec.terrain = terrain;
            spec.resource = resource;
        }
        self
    }

    /// Freeze the topology.
    ///
    /// A node's cost is its explicit override, else its type's rule cost.  A
    /// node is blocked if marked so, if its type is impassable under the
    /// rules, or if its terrain is an obstacle.
    pub fn build(self) -> GridGraph {
        let width = self.width;
        let rules = self.rules;
        let nodes: Vec<GraphNode> = self
            .specs
            .into_iter()
            .enumerate()
            .map(|(i, spec)| {
                let coord = Coord::new((i % width as usize) as i32, (i / width as usize) as i32);
                let rule_cost = rules.cost(spec.node_type);
                let cost = spec.cost.or(rule_cost).unwrap_or(1);
                let node = GraphNode::new(coord, spec.node_type, cost, spec.neighbors);
                node.set_blocked(spec.blocked || rule_cost.is_none() || spec.terrain.is_obstacle());
                node.set_terrain(spec.terrain);
                node.set_resource(spec.resource);
                node
            })
            .collect();
        tracing::debug!(
            graph = %self.id,
            width,
            height = self.height,
            blocked = nodes.iter().filter(|n| n.is_blocked()).count(),
            "graph built"
        );
        GridGraph { id: self.id, width, height: self.height, nodes }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    pub(crate) fn slot(&self, c: Coord) -> Option<usize> {
        (c.x >= 0 && c.y >= 0 && (c.x as u32) < self.width && (c.y as u32) < self.height)
            .then(|| c.y as usize * self.width as usize + c.x as usize)
    }

    fn spec_mut(&mut self, c: Coord) -> Option<&mut NodeSpec> {
        let slot = self.slot(c);
        if slot.is_none() {
            tracing::warn!(coord = %c, "builder ignored out-of-bounds coordinate");
        }
        slot.map(|i| &mut self.specs[i])
    }

    fn link(&mut self, from: Coord, to: Coord) {
        if let Some(i) = self.slot(from) {
            let list = &mut self.specs[i].neighbors;
            if !list.contains(&to) {
                list.push(to);
            }
        }
    }

    fn wire(&mut self, offsets: &[(i32, i32)]) {
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let c = Coord::new(x, y);
                for &(dx, dy) in offsets {
                    let n = c.offset(dx, dy);
                    if self.slot(n).is_some() {
                        self.link(c, n);
                    }
                }
            }
        }
    }
}
