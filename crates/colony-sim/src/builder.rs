//! Fluent builder for constructing a [`Scheduler`].

use colony_core::SimConfig;
use colony_ecs::{System, World};
use rustc_hash::FxHashSet;

use crate::stage::{Stage, StageKind};
use crate::{Scheduler, SimError, SimResult};

/// Fluent builder for [`Scheduler`].
///
/// # Required inputs
///
/// - [`World`]: from [`colony_ecs::WorldBuilder`], with every component
///   and flag type the systems touch already registered
/// - [`SimConfig`]: tick length, total ticks, worker count, orphan sweep
///
/// # Stages
///
/// Stages run in the order they are added.  Within one stage:
///
/// | Method            | Dispatch                                  |
/// |-------------------|-------------------------------------------|
/// | `.parallel(..)`   | All systems concurrently                  |
/// | `.sequential(..)` | One after another, in the given order     |
///
/// # Example
///
/// ```rust,ignore
/// let mut sched = SchedulerBuilder::new(world, config)
///     .parallel("agents", vec![Box::new(pathfinder), Box::new(patrol)])
///     .sequential("flock", colony_flock::flocking_systems())
///     .build()?;
/// sched.run(&mut NoopObserver)?;
/// ```
pub struct SchedulerBuilder {
    world:  World,
    config: SimConfig,
    stages: Vec<Stage>,
}

impl SchedulerBuilder {
    pub fn new(world: World, config: SimConfig) -> Self {
        Self { world, config, stages: Vec::new() }
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn parallel(self, name: impl Into<String>, systems: Vec<Box<dyn System>>) -> Self {
        self.stage(Stage::new(name, StageKind::Parallel, systems))
    }

    pub fn sequential(self, name: impl Into<String>, systems: Vec<Box<dyn System>>) -> Self {
        self.stage(Stage::new(name, StageKind::Sequential, systems))
    }

    /// Validate the configuration, check system names are unique, and start
    /// the worker pool.  Systems are not initialized yet; that happens on
    /// [`Scheduler::initialize`] or the first tick.
    pub fn build(self) -> SimResult<Scheduler> {
        self.config.validate()?;

        let mut seen = FxHashSet::default();
        for stage in &self.stages {
            for name in stage.system_names() {
                if !seen.insert(name.to_owned()) {
                    return Err(SimError::Config(format!("system name {name:?} registered twice")));
                }
            }
        }

        let mut pool = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("colony-worker-{i}"));
        if let Some(n) = self.config.num_threads {
            pool = pool.num_threads(n);
        }
        let pool = pool.build().map_err(|e| SimError::ThreadPool(e.to_string()))?;

        tracing::debug!(stages = self.stages.len(), threads = pool.current_num_threads(), "scheduler built");
        Ok(Scheduler {
            clock:       self.config.make_clock(),
            config:      self.config,
            world:       self.world,
            stages:      self.stages,
            pool,
            initialized: false,
        })
    }
}
