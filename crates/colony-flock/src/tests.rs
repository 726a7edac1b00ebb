//! Unit tests for colony-flock.

#[cfg(test)]
mod helpers {
    use colony_core::{EntityId, Vec2};
    use colony_ecs::{World, WorldBuilder};

    use crate::{BoidConfig, spawn_boid};

    pub fn world() -> World {
        crate::register(WorldBuilder::new()).build()
    }

    pub fn boid(w: &World, x: f32, y: f32) -> EntityId {
        spawn_boid(w, Vec2::new(x, y), Vec2::new(1.0, 0.0), BoidConfig::default()).unwrap()
    }

    pub fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-5
    }
}

// ── Rules ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod rules {
    use colony_core::{EntityId, Vec2};

    use super::helpers::close;
    use crate::steering::{alignment, cohesion, direction, separation};
    use crate::{Acs, BoidConfig, Neighbour, blend};

    fn n(id: u32, x: f32, y: f32, fx: f32, fy: f32) -> Neighbour {
        Neighbour { id: EntityId(id), position: Vec2::new(x, y), forward: Vec2::new(fx, fy) }
    }

    #[test]
    fn no_neighbours_gives_zero() {
        let p = Vec2::new(3.0, 3.0);
        assert_eq!(alignment(&[]), Vec2::ZERO);
        assert_eq!(cohesion(p, &[]), Vec2::ZERO);
        assert_eq!(separation(p, &[]), Vec2::ZERO);
        assert_eq!(direction(p, &[], None), Vec2::ZERO);
    }

    #[test]
    fn alignment_averages_headings() {
        let near = [n(1, 0.0, 0.0, 1.0, 0.0), n(2, 0.0, 0.0, 0.0, 1.0)];
        let h = std::f32::consts::FRAC_1_SQRT_2;
        assert!(close(alignment(&near), Vec2::new(h, h)));
    }

    #[test]
    fn cohesion_points_at_centre() {
        let near = [n(1, 2.0, 1.0, 0.0, 0.0), n(2, 2.0, -1.0, 0.0, 0.0)];
        assert!(close(cohesion(Vec2::ZERO, &near), Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn separation_points_away() {
        let near = [n(1, 0.0, 1.0, 0.0, 0.0)];
        assert!(close(separation(Vec2::ZERO, &near), Vec2::new(0.0, -1.0)));
    }

    #[test]
    fn direction_prefers_target() {
        let near = [n(1, -4.0, 0.0, 0.0, 0.0)];
        let p = Vec2::ZERO;
        assert!(close(direction(p, &near, Some(Vec2::new(0.0, 10.0))), Vec2::new(0.0, 1.0)));
        assert!(close(direction(p, &near, None), Vec2::new(-1.0, 0.0)));
    }

    #[test]
    fn blend_is_weighted_and_normalized() {
        let acs = Acs {
            alignment: Vec2::new(1.0, 0.0),
            separation: Vec2::new(0.0, 1.0),
            ..Acs::default()
        };
        let cfg = BoidConfig { alignment_weight: 3.0, separation_weight: 4.0, ..BoidConfig::default() };
        assert!(close(blend(&acs, &cfg), Vec2::new(0.6, 0.8)));
    }

    #[test]
    fn nan_blend_collapses_to_zero() {
        let acs = Acs { alignment: Vec2::new(1.0, 0.0), ..Acs::default() };
        let cfg = BoidConfig { alignment_weight: f32::NAN, ..BoidConfig::default() };
        assert_eq!(blend(&acs, &cfg), Vec2::ZERO);
    }
}

// ── Radar ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod radar {
    use colony_core::Vec2;
    use colony_ecs::System;

    use super::helpers::{boid, world};
    use crate::{BoidConfig, BoidRadarSystem, Transform, spawn_boid};

    #[test]
    fn finds_neighbours_within_radius_excluding_self() {
        let w = world();
        let a = boid(&w, 0.0, 0.0);
        let b = boid(&w, 3.0, 0.0);
        let c = boid(&w, 0.0, 4.0);
        let far = boid(&w, 50.0, 50.0);

        let mut radar = BoidRadarSystem::new();
        radar.initialize(&w).unwrap();
        radar.run(&w, 0.1);

        let near_a: Vec<_> = w.component::<Transform>(a).unwrap().near.iter().map(|n| n.id).collect();
        assert_eq!(near_a, vec![b, c]);
        assert!(w.component::<Transform>(far).unwrap().near.is_empty());
        let near_b: Vec<_> = w.component::<Transform>(b).unwrap().near.iter().map(|n| n.id).collect();
        assert!(near_b.contains(&a));
    }

    #[test]
    fn radius_is_per_boid() {
        let w = world();
        let short = BoidConfig { detection_radius: 1.0, ..BoidConfig::default() };
        let myopic = spawn_boid(&w, Vec2::ZERO, Vec2::ZERO, short).unwrap();
        let other = boid(&w, 2.0, 0.0);

        let mut radar = BoidRadarSystem::new();
        radar.run(&w, 0.1);

        assert!(w.component::<Transform>(myopic).unwrap().near.is_empty());
        let seen: Vec<_> = w.component::<Transform>(other).unwrap().near.iter().map(|n| n.id).collect();
        assert_eq!(seen, vec![myopic]);
    }

    #[test]
    fn neighbour_list_is_rewritten_each_tick() {
        let w = world();
        let a = boid(&w, 0.0, 0.0);
        let b = boid(&w, 1.0, 0.0);
        let mut radar = BoidRadarSystem::new();
        radar.run(&w, 0.1);
        assert_eq!(w.component::<Transform>(a).unwrap().near.len(), 1);

        w.with_component_mut::<Transform, _>(b, |t| t.position = Vec2::new(100.0, 0.0)).unwrap();
        radar.run(&w, 0.1);
        assert!(w.component::<Transform>(a).unwrap().near.is_empty());
    }

    #[test]
    fn initialize_requires_stores() {
        let w = colony_ecs::WorldBuilder::new().build();
        assert!(BoidRadarSystem::new().initialize(&w).is_err());
    }
}

// ── Chain ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod chain {
    use colony_core::Vec2;
    use colony_ecs::System;

    use super::helpers::{boid, close, world};
    use crate::{Acs, BoidConfig, Transform, flocking_systems, spawn_boid, steering_systems};

    #[test]
    fn order_is_fixed() {
        let names: Vec<String> = flocking_systems().iter().map(|s| s.name().to_owned()).collect();
        assert_eq!(
            names,
            [
                "boid_radar",
                "boid_alignment",
                "boid_cohesion",
                "boid_separation",
                "boid_direction",
                "boid_acs",
                "boid_integrate",
            ]
        );
        assert_eq!(steering_systems().len(), 6);
    }

    #[test]
    fn pair_separates_and_moves() {
        let w = world();
        let cfg = BoidConfig {
            alignment_weight: 0.0,
            cohesion_weight: 0.0,
            direction_weight: 0.0,
            separation_weight: 1.0,
            speed: 2.0,
            ..BoidConfig::default()
        };
        let a = spawn_boid(&w, Vec2::new(0.0, 0.0), Vec2::ZERO, cfg.clone()).unwrap();
        let b = spawn_boid(&w, Vec2::new(1.0, 0.0), Vec2::ZERO, cfg).unwrap();

        let mut systems = flocking_systems();
        for s in &mut systems {
            s.initialize(&w).unwrap();
        }
        for s in &mut systems {
            s.run(&w, 0.5);
        }

        assert!(close(w.component::<Acs>(a).unwrap().acs, Vec2::new(-1.0, 0.0)));
        let ta = w.component::<Transform>(a).unwrap();
        let tb = w.component::<Transform>(b).unwrap();
        assert!(close(ta.position, Vec2::new(-1.0, 0.0)));
        assert!(close(tb.position, Vec2::new(2.0, 0.0)));
        assert!(close(tb.forward, Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn lone_boid_with_target_heads_for_it() {
        let w = world();
        let cfg = BoidConfig { target: Some(Vec2::new(0.0, 10.0)), ..BoidConfig::default() };
        let e = spawn_boid(&w, Vec2::ZERO, Vec2::new(1.0, 0.0), cfg).unwrap();

        for mut s in flocking_systems() {
            s.run(&w, 1.0);
        }
        let t = w.component::<Transform>(e).unwrap();
        assert!(close(t.position, Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn lone_boid_without_target_stays_put() {
        let w = world();
        let e = boid(&w, 4.0, 4.0);
        for mut s in flocking_systems() {
            s.run(&w, 1.0);
        }
        let t = w.component::<Transform>(e).unwrap();
        assert_eq!(t.position, Vec2::new(4.0, 4.0));
        assert_eq!(w.component::<Acs>(e).unwrap().acs, Vec2::ZERO);
    }

    #[test]
    fn many_boids_stay_finite() {
        let w = world();
        for i in 0..200 {
            boid(&w, (i % 20) as f32 * 0.5, (i / 20) as f32 * 0.5);
        }
        let mut systems = flocking_systems();
        for _ in 0..10 {
            for s in &mut systems {
                s.run(&w, 0.1);
            }
        }
        w.component_store::<Transform>().unwrap().for_each(|_, t| {
            assert!(t.position.is_finite());
        });
    }
}
