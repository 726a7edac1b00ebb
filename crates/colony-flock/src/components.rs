//! Components shared by the flocking systems.

use colony_core::{EntityId, Vec2};
use colony_ecs::{EcsResult, World, WorldBuilder};

/// A boid seen by the radar this tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Neighbour {
    pub id:       EntityId,
    pub position: Vec2,
    pub forward:  Vec2,
}

/// Where a boid is, which way it faces, and who it can see.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    /// Unit heading.  Zero until the boid first moves.
    pub forward:  Vec2,
    /// Rewritten by `BoidRadarSystem` every tick, ascending by id.
    pub near:     Vec<Neighbour>,
}

impl Transform {
    pub fn new(position: Vec2, forward: Vec2) -> Self {
        Self { position, forward: forward.normalized(), near: Vec::new() }
    }
}

/// Per-boid tuning.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BoidConfig {
    /// Neighbours farther than this are invisible.
    pub detection_radius:  f32,
    pub alignment_weight:  f32,
    pub cohesion_weight:   f32,
    pub separation_weight: f32,
    pub direction_weight:  f32,
    /// World units per second along the blended heading.
    pub speed:             f32,
    /// Goal for the direction rule.  Without one, the boid heads for the
    /// middle of whatever it can see.
    pub target:            Option<Vec2>,
}

impl Default for BoidConfig {
    fn default() -> Self {
        Self {
            detection_radius:  5.0,
            alignment_weight:  1.0,
            cohesion_weight:   1.0,
            separation_weight: 1.5,
            direction_weight:  1.0,
            speed:             1.0,
            target:            None,
        }
    }
}

/// Steering vectors for one tick: one per rule plus their blend.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Acs {
    pub alignment:  Vec2,
    pub cohesion:   Vec2,
    pub separation: Vec2,
    pub direction:  Vec2,
    /// Weighted, normalized sum of the four rules.
    pub acs:        Vec2,
}

// ── Setup helpers ─────────────────────────────────────────────────────────────

/// Register the flocking component types on `builder`.
pub fn register(builder: WorldBuilder) -> WorldBuilder {
    builder
        .register_component::<Transform>()
        .register_component::<BoidConfig>()
        .register_component::<Acs>()
}

/// Create an entity carrying everything the flocking chain needs.
pub fn spawn_boid(world: &World, position: Vec2, forward: Vec2, config: BoidConfig) -> EcsResult<EntityId> {
    let id = world.create_entity();
    world.add_component(id, Transform::new(position, forward))?;
    world.add_component(id, config)?;
    world.add_component(id, Acs::default())?;
    Ok(id)
}
