//! Seeded random map generation.
//!
//! Every cell draws one uniform sample to pick its ground type:
//!
//! | Sample         | Type     |
//! |----------------|----------|
//! | `< 0.98`       | Plains   |
//! | `< 0.985`      | Mountain |
//! | `< 0.997`      | Sand     |
//! | otherwise      | Lake (at most [`MAX_LAKES`]; plains once the cap is hit) |
//!
//! Then [`FEATURE_COUNT`] mines, trees and stumps are scattered over shuffled
//! plain cells.  Same seed, same map.

use colony_core::SimRng;

use crate::graph::{GridGraphBuilder, NodeTerrain, NodeType};

pub const MAX_LAKES: usize = 20;
pub const FEATURE_COUNT: usize = 20;

const MINE_RESOURCE: i32 = 500;
const TREE_RESOURCE: i32 = 100;

impl GridGraphBuilder {
    /// Overwrite every cell's type and terrain with a seeded random map.
    ///
    /// Call before [`block`][Self::block] / [`terrain`][Self::terrain] if
    /// those should survive.
    pub fn random_terrain(mut self, seed: u64) -> Self {
        let mut rng = SimRng::new(seed);
        let mut lakes = 0;

        for spec in &mut self.specs {
            let sample: f32 = rng.random();
            spec.node_type = if sample < 0.98 {
                NodeType::Plains
            } else if sample < 0.985 {
                NodeType::Mountain
            } else if sample < 0.997 {
                NodeType::Sand
            } else if lakes < MAX_LAKES {
                lakes += 1;
                NodeType::Lake
            } else {
                NodeType::Plains
            };
            spec.terrain = match spec.node_type {
                NodeType::Lake => NodeTerrain::Lake,
                NodeType::Mountain => NodeTerrain::Mountain,
                _ => NodeTerrain::Empty,
            };
            spec.resource = 0;
        }

        let mut open: Vec<usize> = self
            .specs
            .iter()
            .enumerate()
            .filter(|(_, s)| s.node_type == NodeType::Plains && !s.blocked)
            .map(|(i, _)| i)
            .collect();
        rng.shuffle(&mut open);

        let features = [
            (NodeTerrain::Mine, MINE_RESOURCE),
            (NodeTerrain::Tree, TREE_RESOURCE),
            (NodeTerrain::Stump, 0),
        ];
        let mut slots = open.into_iter();
        for (terrain, resource) in features {
            for slot in slots.by_ref().take(FEATURE_COUNT) {
                self.specs[slot].terrain = terrain;
                self.specs[slot].resource = resource;
            }
        }

        tracing::debug!(seed, lakes, "random terrain generated");
        self
    }
}
