//! `BoidRadarSystem` — fills each boid's neighbour list from an R-tree.
//!
//! `pre_execute` bulk-loads every boid position into an `rstar` tree;
//! `execute` queries it once per boid in parallel and rewrites
//! `Transform::near`; `post_execute` drops the tree.  All boids therefore
//! see positions from the same instant, whatever order the queries run in.

use colony_core::{EntityId, Vec2};
use colony_ecs::{Access, EcsResult, System, World};
use rayon::prelude::*;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::components::{BoidConfig, Neighbour, Transform};

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct BoidEntry {
    point:   [f32; 2],
    id:      EntityId,
    forward: Vec2,
}

impl RTreeObject for BoidEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for BoidEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── System ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct BoidRadarSystem {
    tree:   RTree<BoidEntry>,
    /// `(boid, position, squared radius)` for every boid with a config.
    probes: Vec<(EntityId, [f32; 2], f32)>,
}

impl BoidRadarSystem {
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for BoidRadarSystem {
    fn name(&self) -> &str {
        "boid_radar"
    }

    fn access(&self) -> Access {
        Access::new().reads::<BoidConfig>().reads::<Transform>().writes::<Transform>()
    }

    fn initialize(&mut self, world: &World) -> EcsResult<()> {
        world.component_store::<Transform>()?;
        world.component_store::<BoidConfig>()?;
        Ok(())
    }

    fn pre_execute(&mut self, world: &World, _dt: f32) {
        self.probes.clear();
        let (Ok(transforms), Ok(configs)) =
            (world.component_store::<Transform>(), world.component_store::<BoidConfig>())
        else {
            self.tree = RTree::new();
            return;
        };

        let mut entries = Vec::with_capacity(transforms.len());
        transforms.for_each(|id, t| {
            let point = t.position.to_array();
            entries.push(BoidEntry { point, id, forward: t.forward });
            if let Some(cfg) = configs.get(id) {
                self.probes.push((id, point, cfg.detection_radius * cfg.detection_radius));
            }
        });
        self.tree = RTree::bulk_load(entries);
    }

    fn execute(&mut self, world: &World, _dt: f32) {
        let Ok(transforms) = world.component_store::<Transform>() else { return };
        let tree = &self.tree;
        self.probes.par_iter().for_each(|&(id, point, radius_2)| {
            let mut near: Vec<Neighbour> = tree
                .locate_within_distance(point, radius_2)
                .filter(|e| e.id != id)
                .map(|e| Neighbour { id: e.id, position: Vec2::new(e.point[0], e.point[1]), forward: e.forward })
                .collect();
            near.sort_unstable_by_key(|n| n.id);
            if let Some(mut t) = transforms.get_mut(id) {
                t.near = near;
            }
        });
    }

    fn post_execute(&mut self, _world: &World, _dt: f32) {
        tracing::trace!(boids = self.probes.len(), "radar sweep done");
        self.tree = RTree::new();
        self.probes.clear();
    }
}
