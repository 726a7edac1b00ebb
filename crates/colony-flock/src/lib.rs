//! `colony-flock` — boid flocking as a fixed chain of systems.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`components`] | `Transform`, `Neighbour`, `BoidConfig`, `Acs`, `spawn_boid` |
//! | [`radar`]      | `BoidRadarSystem`: R-tree neighbour detection              |
//! | [`steering`]   | Alignment, cohesion, separation and direction rules        |
//! | [`blend`]      | `AcsSystem` (weighted blend), `IntegrateSystem` (movement) |
//!
//! # Ordering
//!
//! Every stage reads what the previous one wrote, so the chain must run in
//! a sequential scheduler stage, in the order [`flocking_systems`] returns:
//!
//! ```text
//! radar → alignment → cohesion → separation → direction → acs → integrate
//! ```

pub mod blend;
pub mod components;
pub mod radar;
pub mod steering;

#[cfg(test)]
mod tests;

use colony_ecs::System;

pub use blend::{AcsSystem, IntegrateSystem, blend};
pub use components::{Acs, BoidConfig, Neighbour, Transform, register, spawn_boid};
pub use radar::BoidRadarSystem;
pub use steering::{AlignmentSystem, CohesionSystem, DirectionSystem, SeparationSystem};

/// Radar through blend, without movement.  For callers that move boids
/// themselves from `Acs::acs`.
pub fn steering_systems() -> Vec<Box<dyn System>> {
    vec![
        Box::new(BoidRadarSystem::new()),
        Box::new(AlignmentSystem),
        Box::new(CohesionSystem),
        Box::new(SeparationSystem),
        Box::new(DirectionSystem),
        Box::new(AcsSystem),
    ]
}

/// The full chain, ending with [`IntegrateSystem`].
pub fn flocking_systems() -> Vec<Box<dyn System>> {
    let mut systems = steering_systems();
    systems.push(Box::new(IntegrateSystem));
    systems
}
