//! `AcsSystem` blends the four rules; `IntegrateSystem` moves boids along
//! the blend.

use colony_core::Vec2;
use colony_ecs::{Access, EcsResult, System, World};

use crate::components::{Acs, BoidConfig, Transform};

/// Weighted sum of the rule vectors, normalized.  A non-finite result
/// (e.g. from a NaN weight) collapses to zero.
pub fn blend(acs: &Acs, cfg: &BoidConfig) -> Vec2 {
    let sum = acs.alignment * cfg.alignment_weight
        + acs.cohesion * cfg.cohesion_weight
        + acs.separation * cfg.separation_weight
        + acs.direction * cfg.direction_weight;
    sum.or_zero().normalized().or_zero()
}

#[derive(Copy, Clone, Debug, Default)]
pub struct AcsSystem;

impl System for AcsSystem {
    fn name(&self) -> &str {
        "boid_acs"
    }

    fn access(&self) -> Access {
        Access::new().reads::<BoidConfig>().reads::<Acs>().writes::<Acs>()
    }

    fn initialize(&mut self, world: &World) -> EcsResult<()> {
        world.component_store::<Acs>()?;
        world.component_store::<BoidConfig>()?;
        Ok(())
    }

    fn execute(&mut self, world: &World, _dt: f32) {
        let (Ok(acs), Ok(configs)) = (world.component_store::<Acs>(), world.component_store::<BoidConfig>())
        else {
            return;
        };
        acs.par_for_each_mut(|id, a| {
            a.acs = match configs.get(id) {
                Some(cfg) => blend(a, &cfg),
                None => Vec2::ZERO,
            };
        });
    }
}

/// Advances `Transform::position` by `acs * speed * dt` and turns the boid
/// to face its new heading.  A zero blend leaves the boid where it is.
#[derive(Copy, Clone, Debug, Default)]
pub struct IntegrateSystem;

impl System for IntegrateSystem {
    fn name(&self) -> &str {
        "boid_integrate"
    }

    fn access(&self) -> Access {
        Access::new().reads::<Acs>().reads::<BoidConfig>().writes::<Transform>()
    }

    fn initialize(&mut self, world: &World) -> EcsResult<()> {
        world.component_store::<Transform>()?;
        world.component_store::<Acs>()?;
        world.component_store::<BoidConfig>()?;
        Ok(())
    }

    fn execute(&mut self, world: &World, dt: f32) {
        let (Ok(transforms), Ok(acs), Ok(configs)) = (
            world.component_store::<Transform>(),
            world.component_store::<Acs>(),
            world.component_store::<BoidConfig>(),
        ) else {
            return;
        };
        transforms.par_for_each_mut(|id, t| {
            let (Some(a), Some(cfg)) = (acs.get(id), configs.get(id)) else { return };
            if a.acs == Vec2::ZERO {
                return;
            }
            t.position += a.acs * (cfg.speed * dt);
            t.forward = a.acs;
        });
    }
}
