//! Patrol demo: FSM-driven agents walking between waypoints on two graphs,
//! with a boid flock sharing the same scheduler.
//!
//! ```text
//! RUST_LOG=info cargo run -p colony-patrol --release -- demos/patrol/demo.toml
//! ```

mod config;
mod patrol;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::Result;
use colony_core::{GraphId, SimRng, Tick, Vec2};
use colony_ecs::WorldBuilder;
use colony_flock::{Transform, flocking_systems, spawn_boid};
use colony_path::{
    GridGraph, GridGraphBuilder, NodeType, PathRequest, PathResult, PathfinderSystem, TraversalRules, UnitFlag,
};
use colony_sim::{SchedulerBuilder, SimObserver};
use tracing::info;

use crate::config::DemoConfig;
use crate::patrol::{PatrolStats, PatrolSystem, Position};

fn main() -> Result<()> {
    init_tracing();

    let path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("demos/patrol/demo.toml"), PathBuf::from);
    let config = DemoConfig::load(&path)?;
    info!(seed = config.sim.seed, ticks = config.sim.total_ticks, "starting patrol demo");

    let graphs = build_graphs(&config);
    let world = colony_flock::register(WorldBuilder::new())
        .register_component::<PathRequest>()
        .register_component::<PathResult>()
        .register_component::<Position>()
        .register_flag::<UnitFlag>()
        .build();

    let mut rng = SimRng::new(config.sim.seed);
    let patrol = PatrolSystem::spawn(
        &world,
        &graphs,
        config.patrol.agents,
        config.patrol.waypoints,
        config.patrol.wait_ticks,
        &mut rng.child(1),
    )?;
    let stats = patrol.stats();

    let mut flock_rng = rng.child(2);
    let spread = config.flock.spread.max(f32::EPSILON);
    for _ in 0..config.flock.boids {
        let at = Vec2::new(flock_rng.gen_range(0.0..spread), flock_rng.gen_range(0.0..spread));
        let heading = Vec2::new(flock_rng.gen_range(-1.0..1.0), flock_rng.gen_range(-1.0..1.0));
        spawn_boid(&world, at, heading, config.flock.boid.clone())?;
    }

    let pathfinder = PathfinderSystem::new(graphs).with_config(config.pathfinding.clone());
    let mut sched = SchedulerBuilder::new(world, config.sim.clone())
        .parallel("navigation", vec![Box::new(pathfinder)])
        .sequential("agents", vec![Box::new(patrol)])
        .sequential("flock", flocking_systems())
        .build()?;

    let mut progress = Progress { every: (config.sim.total_ticks / 10).max(1), stats, busiest: Duration::ZERO };
    sched.run(&mut progress)?;

    let mut centre = Vec2::ZERO;
    let boids = sched.world().component_store::<Transform>()?;
    boids.for_each(|_, t| centre += t.position);
    if !boids.is_empty() {
        centre = centre / boids.len() as f32;
    }
    info!(x = centre.x, y = centre.y, boids = boids.len(), "flock centre at end of run");
    sched.shutdown();
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Graph 0 for carts: default rules, four-connected.  Graph 1 for
/// gatherers: sand at plains cost, eight-connected.  Both share one seeded
/// terrain.
fn build_graphs(config: &DemoConfig) -> Vec<Arc<GridGraph>> {
    let (w, h, seed) = (config.map.width, config.map.height, config.sim.seed);

    let carts = GridGraphBuilder::new(w, h).id(GraphId(0)).random_terrain(seed).four_connected().build();

    let mut sandy = TraversalRules::default();
    sandy.set(NodeType::Sand, Some(1));
    let gatherers = GridGraphBuilder::new(w, h)
        .id(GraphId(1))
        .rules(sandy)
        .random_terrain(seed)
        .eight_connected()
        .build();

    vec![Arc::new(carts), Arc::new(gatherers)]
}

/// Logs progress every `every` ticks and a summary at the end.
struct Progress {
    every:   u64,
    stats:   Arc<PatrolStats>,
    busiest: Duration,
}

impl SimObserver for Progress {
    fn on_tick_end(&mut self, tick: Tick, elapsed: Duration) {
        self.busiest = self.busiest.max(elapsed);
        if tick.0 % self.every == 0 {
            info!(
                %tick,
                arrivals = self.stats.arrivals.load(Ordering::Relaxed),
                blocked = self.stats.blocked.load(Ordering::Relaxed),
                ?elapsed,
                "progress"
            );
        }
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        info!(
            %final_tick,
            arrivals = self.stats.arrivals.load(Ordering::Relaxed),
            blocked = self.stats.blocked.load(Ordering::Relaxed),
            busiest_tick = ?self.busiest,
            "simulation finished"
        );
    }
}
