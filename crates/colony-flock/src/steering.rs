//! The four steering rules and the systems that apply them.
//!
//! Each rule reads a boid's `Transform` (and, for direction, its
//! `BoidConfig`) and writes one field of its `Acs`.  The rules are
//! independent of each other but all depend on the radar having run.
//! A boid with no neighbours gets a zero vector from every neighbour-based
//! rule.

use colony_core::Vec2;
use colony_ecs::{Access, EcsResult, System, World};

use crate::components::{Acs, BoidConfig, Neighbour, Transform};

// ── Rules ─────────────────────────────────────────────────────────────────────

/// Average neighbour heading.
pub fn alignment(near: &[Neighbour]) -> Vec2 {
    mean(near.iter().map(|n| n.forward)).normalized()
}

/// Toward the neighbours' centre of mass.
pub fn cohesion(position: Vec2, near: &[Neighbour]) -> Vec2 {
    if near.is_empty() {
        return Vec2::ZERO;
    }
    (mean(near.iter().map(|n| n.position)) - position).normalized()
}

/// Away from every neighbour.
pub fn separation(position: Vec2, near: &[Neighbour]) -> Vec2 {
    let mut push = Vec2::ZERO;
    for n in near {
        push += position - n.position;
    }
    push.normalized()
}

/// Toward the configured target, else the mean offset to the neighbours.
pub fn direction(position: Vec2, near: &[Neighbour], target: Option<Vec2>) -> Vec2 {
    match target {
        Some(goal) => (goal - position).normalized(),
        None => mean(near.iter().map(|n| n.position - position)).normalized(),
    }
}

fn mean(vs: impl Iterator<Item = Vec2>) -> Vec2 {
    let (sum, n) = vs.fold((Vec2::ZERO, 0u32), |(s, n), v| (s + v, n + 1));
    if n == 0 { Vec2::ZERO } else { sum / n as f32 }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Recompute one `Acs` field for every boid, in parallel.
fn steer<R>(world: &World, rule: R)
where
    R: Fn(&Transform, Option<&BoidConfig>, &mut Acs) + Send + Sync,
{
    let (Ok(acs), Ok(transforms)) = (world.component_store::<Acs>(), world.component_store::<Transform>())
    else {
        return;
    };
    let configs = world.component_store::<BoidConfig>().ok();
    acs.par_for_each_mut(|id, out| {
        let Some(t) = transforms.get(id) else { return };
        let cfg = configs.and_then(|c| c.get(id));
        rule(&t, cfg.as_deref(), out);
    });
}

fn require_stores(world: &World) -> EcsResult<()> {
    world.component_store::<Transform>()?;
    world.component_store::<Acs>()?;
    Ok(())
}

macro_rules! steering_system {
    ($(#[$doc:meta])* $name:ident, $label:literal, |$t:ident, $cfg:ident, $acs:ident| $body:expr) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Debug, Default)]
        pub struct $name;

        impl System for $name {
            fn name(&self) -> &str {
                $label
            }

            fn access(&self) -> Access {
                Access::new().reads::<Transform>().reads::<BoidConfig>().writes::<Acs>()
            }

            fn initialize(&mut self, world: &World) -> EcsResult<()> {
                require_stores(world)
            }

            fn execute(&mut self, world: &World, _dt: f32) {
                steer(world, |$t: &Transform, $cfg: Option<&BoidConfig>, $acs: &mut Acs| $body);
            }
        }
    };
}

steering_system!(
    /// Writes `Acs::alignment`.
    AlignmentSystem, "boid_alignment",
    |t, _cfg, acs| acs.alignment = alignment(&t.near)
);

steering_system!(
    /// Writes `Acs::cohesion`.
    CohesionSystem, "boid_cohesion",
    |t, _cfg, acs| acs.cohesion = cohesion(t.position, &t.near)
);

steering_system!(
    /// Writes `Acs::separation`.
    SeparationSystem, "boid_separation",
    |t, _cfg, acs| acs.separation = separation(t.position, &t.near)
);

steering_system!(
    /// Writes `Acs::direction`.
    DirectionSystem, "boid_direction",
    |t, cfg, acs| acs.direction = direction(t.position, &t.near, cfg.and_then(|c| c.target))
);
