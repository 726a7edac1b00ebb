//! Components and flags the pathfinding service reads and writes.

use colony_core::{Coord, GraphId, UnitFlags};

/// "Find me a path", attached to the requesting entity.
///
/// The service resolves each request once and then sets `processed`, so
/// later ticks skip it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathRequest {
    pub start:       Coord,
    pub destination: Coord,
    pub processed:   bool,
}

impl PathRequest {
    pub fn new(start: Coord, destination: Coord) -> Self {
        Self { start, destination, processed: false }
    }
}

/// Outcome of a [`PathRequest`]; an empty path means no path exists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathResult {
    pub path: Vec<Coord>,
}

impl PathResult {
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn found(&self) -> bool {
        !self.path.is_empty()
    }

    /// Where the path actually ends.  Differs from the requested destination
    /// when that was blocked and a neighbour was substituted.
    pub fn end(&self) -> Option<Coord> {
        self.path.last().copied()
    }
}

/// Movement-capability flag; selects which graph an entity's requests are
/// searched on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct UnitFlag(pub UnitFlags);

// ── GraphRouting ──────────────────────────────────────────────────────────────

/// Maps an entity's [`UnitFlags`] to the graph its searches run on.
///
/// Rules are tried in order; the first whose flag the entity carries wins.
/// Entities matching no rule, or carrying no [`UnitFlag`] at all, use the
/// fallback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphRouting {
    rules:    Vec<(UnitFlags, GraphId)>,
    fallback: GraphId,
}

impl Default for GraphRouting {
    /// Gatherers on graph 1, builders on graph 2, carts and everything else
    /// on graph 0.
    fn default() -> Self {
        Self::new(GraphId(0))
            .route(UnitFlags::GATHERER, GraphId(1))
            .route(UnitFlags::BUILDER, GraphId(2))
            .route(UnitFlags::CART, GraphId(0))
    }
}

impl GraphRouting {
    /// No rules; everything goes to `fallback`.
    pub fn new(fallback: GraphId) -> Self {
        Self { rules: Vec::new(), fallback }
    }

    pub fn route(mut self, flag: UnitFlags, graph: GraphId) -> Self {
        self.rules.push((flag, graph));
        self
    }

    pub fn graph_for(&self, flags: Option<UnitFlags>) -> GraphId {
        let Some(flags) = flags else { return self.fallback };
        self.rules
            .iter()
            .find(|(flag, _)| flags.contains(*flag))
            .map_or(self.fallback, |&(_, graph)| graph)
    }
}
