//! `PathfinderSystem` — resolves pending path requests once per tick.
//!
//! # Phases
//!
//! | Phase          | Work                                                    |
//! |----------------|---------------------------------------------------------|
//! | `pre_execute`  | Snapshot every unprocessed `PathRequest`, sorted by id  |
//! | `execute`      | One search per request, in parallel; write results back |
//! | `post_execute` | Publish batch counts, clear the snapshot                |
//!
//! Requests written after `pre_execute` wait for the next tick.  A request
//! replaced between snapshot and write-back is left alone; its stale result
//! is dropped.
//!
//! # Data access
//!
//! Reads `PathRequest` and the `UnitFlag` flag; writes `PathRequest` (the
//! `processed` bit) and `PathResult`.

use std::sync::Arc;

use colony_core::{Coord, EntityId, GraphId};
use colony_ecs::{Access, EcsError, EcsResult, System, World};
use rayon::prelude::*;

use crate::astar::{AStar, PathSearch};
use crate::components::{GraphRouting, PathRequest, PathResult, UnitFlag};
use crate::graph::GridGraph;
use crate::{PathError, PathfindingConfig, PathfindingResult};

// ── Agent-facing API ──────────────────────────────────────────────────────────

/// Ask for a path for `entity`.  Any previous result is discarded first, so
/// a later poll can only see the answer to this request.
pub fn request_path(world: &World, entity: EntityId, start: Coord, destination: Coord) -> EcsResult<()> {
    world.remove_component::<PathResult>(entity)?;
    world.add_component(entity, PathRequest::new(start, destination))
}

/// The resolved path for `entity`, if the service has answered yet.
pub fn poll_path_result(world: &World, entity: EntityId) -> Option<PathResult> {
    world.component::<PathResult>(entity).ok()
}

// ── Batch statistics ──────────────────────────────────────────────────────────

/// Counts for the requests handled in one tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Requests that got a `PathResult` written.
    pub resolved:    usize,
    pub found:       usize,
    pub unreachable: usize,
    /// Requests dropped: entity gone, request replaced, or unknown graph.
    pub skipped:     usize,
}

enum Outcome {
    Found,
    Unreachable,
    Skipped,
}

// ── PathfinderSystem ──────────────────────────────────────────────────────────

pub struct PathfinderSystem {
    graphs:     Vec<Arc<GridGraph>>,
    routing:    GraphRouting,
    search:     Box<dyn PathSearch>,
    pending:    Vec<(EntityId, PathRequest)>,
    last_batch: BatchStats,
}

impl PathfinderSystem {
    /// Default routing and A* with default settings.
    pub fn new(graphs: Vec<Arc<GridGraph>>) -> Self {
        Self {
            graphs,
            routing: GraphRouting::default(),
            search: Box::new(AStar::default()),
            pending: Vec::new(),
            last_batch: BatchStats::default(),
        }
    }

    pub fn with_routing(mut self, routing: GraphRouting) -> Self {
        self.routing = routing;
        self
    }

    pub fn with_config(self, config: PathfindingConfig) -> Self {
        self.with_search(AStar::new(config))
    }

    pub fn with_search(mut self, search: impl PathSearch + 'static) -> Self {
        self.search = Box::new(search);
        self
    }

    pub fn graphs(&self) -> &[Arc<GridGraph>] {
        &self.graphs
    }

    pub fn graph(&self, id: GraphId) -> PathfindingResult<&Arc<GridGraph>> {
        self.graphs
            .iter()
            .find(|g| g.id() == id)
            .ok_or(PathError::UnknownGraph(id))
    }

    pub fn last_batch(&self) -> BatchStats {
        self.last_batch
    }

    fn resolve(&self, world: &World, entity: EntityId, request: &PathRequest) -> Outcome {
        let flags = world.flag::<UnitFlag>(entity).ok().map(|f| f.0);
        let graph_id = self.routing.graph_for(flags);
        let graph = match self.graph(graph_id) {
            Ok(graph) => graph,
            Err(e) => {
                tracing::warn!(%entity, error = %e, "path request dropped");
                return Outcome::Skipped;
            }
        };

        let result = match self.search.search(graph, request.start, request.destination) {
            Ok(path) => PathResult { path },
            Err(PathError::Unreachable { .. }) => PathResult::not_found(),
            Err(e) => {
                tracing::warn!(%entity, error = %e, "path search rejected request");
                PathResult::not_found()
            }
        };

        // Only claim the request if it is still the one we snapshotted.
        let claimed = world.with_component_mut::<PathRequest, _>(entity, |live| {
            let same = live.start == request.start && live.destination == request.destination;
            if same && !live.processed {
                live.processed = true;
                true
            } else {
                false
            }
        });
        match claimed {
            Ok(true) => {}
            Ok(false) => return Outcome::Skipped,
            Err(e) => {
                tracing::warn!(%entity, error = %e, "requester vanished mid-search");
                return Outcome::Skipped;
            }
        }

        let found = result.found();
        match world.add_component(entity, result) {
            Ok(()) if found => Outcome::Found,
            Ok(()) => Outcome::Unreachable,
            Err(e) => {
                tracing::warn!(%entity, error = %e, "could not store path result");
                Outcome::Skipped
            }
        }
    }
}

impl System for PathfinderSystem {
    fn name(&self) -> &str {
        "pathfinder"
    }

    fn access(&self) -> Access {
        Access::new()
            .reads::<PathRequest>()
            .reads::<UnitFlag>()
            .writes::<PathRequest>()
            .writes::<PathResult>()
    }

    fn initialize(&mut self, world: &World) -> EcsResult<()> {
        world.component_store::<PathRequest>()?;
        world.component_store::<PathResult>()?;
        if let Err(EcsError::NoSuchStore { .. }) = world.flag_store::<UnitFlag>() {
            tracing::debug!("no UnitFlag store; every request uses the fallback graph");
        }
        tracing::debug!(graphs = self.graphs.len(), "pathfinder initialized");
        Ok(())
    }

    fn pre_execute(&mut self, world: &World, _dt: f32) {
        self.pending.clear();
        let Ok(requests) = world.component_store::<PathRequest>() else { return };
        requests.for_each(|id, req| {
            if !req.processed {
                self.pending.push((id, req.clone()));
            }
        });
        self.pending.sort_unstable_by_key(|(id, _)| *id);
    }

    fn execute(&mut self, world: &World, _dt: f32) {
        let this = &*self;
        let outcomes: Vec<Outcome> = this
            .pending
            .par_iter()
            .map(|(id, req)| this.resolve(world, *id, req))
            .collect();

        let mut stats = BatchStats::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Found => {
                    stats.resolved += 1;
                    stats.found += 1;
                }
                Outcome::Unreachable => {
                    stats.resolved += 1;
                    stats.unreachable += 1;
                }
                Outcome::Skipped => stats.skipped += 1,
            }
        }
        self.last_batch = stats;
    }

    fn post_execute(&mut self, _world: &World, _dt: f32) {
        if !self.pending.is_empty() {
            let s = self.last_batch;
            tracing::debug!(
                resolved = s.resolved,
                found = s.found,
                unreachable = s.unreachable,
                skipped = s.skipped,
                "path batch done"
            );
        }
        self.pending.clear();
    }

    fn deinitialize(&mut self, _world: &World) {
        self.pending.clear();
        self.last_batch = BatchStats::default();
    }
}
