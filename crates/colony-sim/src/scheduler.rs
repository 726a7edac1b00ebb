//! The `Scheduler` struct and its tick loop.

use std::time::Instant;

use colony_core::{SimClock, SimConfig, Tick};
use colony_ecs::{System, World};

use crate::stage::Stage;
use crate::{SimError, SimObserver, SimResult};

/// Owns the world and every registered system, and drives them tick by tick.
///
/// One tick:
///
/// 1. Each stage in registration order; inside a stage, systems run
///    sequentially or concurrently according to its [`StageKind`][crate::StageKind].
///    Every system goes through `pre_execute → execute → post_execute`
///    with the same `dt`.
/// 2. Orphan sweep, when `SimConfig::sweep_orphans` is set.
/// 3. Clock advance.
///
/// All work runs on the scheduler's own rayon pool, so systems that fan out
/// with rayon internally share the configured thread count.
///
/// Create via [`SchedulerBuilder`][crate::SchedulerBuilder].
pub struct Scheduler {
    pub(crate) world:       World,
    pub(crate) config:      SimConfig,
    pub(crate) clock:       SimClock,
    pub(crate) stages:      Vec<Stage>,
    pub(crate) pool:        rayon::ThreadPool,
    pub(crate) initialized: bool,
}

impl Scheduler {
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Every system name, stage by stage.
    pub fn system_names(&self) -> Vec<&str> {
        self.stages.iter().flat_map(|s| s.system_names()).collect()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Call `initialize` on every system, in stage order.  The first failure
    /// aborts start-up; later systems are left uninitialized.
    ///
    /// Idempotent: a second call does nothing.
    pub fn initialize(&mut self) -> SimResult<()> {
        if self.initialized {
            return Ok(());
        }
        for stage in &mut self.stages {
            for (a, b) in stage.conflicts() {
                tracing::warn!(stage = %stage.name, %a, %b, "parallel systems write overlapping components");
            }
            for system in &mut stage.systems {
                tracing::debug!(stage = %stage.name, system = system.name(), access = %system.access(), "initializing");
                system.initialize(&self.world)?;
            }
        }
        self.initialized = true;
        tracing::info!(
            stages = self.stages.len(),
            systems = self.system_names().len(),
            threads = self.thread_count(),
            "scheduler started"
        );
        Ok(())
    }

    /// Call `deinitialize` on every system.  Safe to call more than once;
    /// only the first call after `initialize` does anything.
    pub fn shutdown(&mut self) {
        if !self.initialized {
            return;
        }
        for system in self.stages.iter_mut().flat_map(|s| s.systems.iter_mut()) {
            system.deinitialize(&self.world);
        }
        self.initialized = false;
        tracing::info!(tick = %self.clock.current_tick, "scheduler stopped");
    }

    // ── Driving ───────────────────────────────────────────────────────────

    /// Run one tick with an explicit step length, initializing first if
    /// needed.
    pub fn tick(&mut self, dt: f32) -> SimResult<()> {
        self.initialize()?;
        let Self { world, stages, pool, .. } = self;
        pool.install(|| {
            for stage in stages.iter_mut() {
                stage.run(world, dt);
            }
        });
        if self.config.sweep_orphans {
            let swept = self.world.sweep_orphans();
            if swept > 0 {
                tracing::debug!(swept, tick = %self.clock.current_tick, "orphaned entries removed");
            }
        }
        self.clock.advance();
        Ok(())
    }

    /// Run from the current tick to `config.end_tick()`, then call
    /// `on_sim_end`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.config.end_tick() {
            self.observed_tick(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.observed_tick(observer)?;
        }
        Ok(())
    }

    /// Run a single registered system's three phases on demand, outside the
    /// normal stage order.  The clock does not advance.
    pub fn run_system(&mut self, name: &str, dt: f32) -> SimResult<()> {
        self.initialize()?;
        let Self { world, stages, pool, .. } = self;
        let system = find_system(stages, name).ok_or_else(|| SimError::UnknownSystem(name.to_owned()))?;
        pool.install(|| system.run(world, dt));
        Ok(())
    }

    fn observed_tick<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now: Tick = self.clock.current_tick;
        observer.on_tick_start(now);
        let started = Instant::now();
        self.tick(self.clock.tick_dt_secs)?;
        observer.on_tick_end(now, started.elapsed());
        Ok(())
    }
}

fn find_system<'a>(stages: &'a mut [Stage], name: &str) -> Option<&'a mut Box<dyn System>> {
    stages
        .iter_mut()
        .flat_map(|s| s.systems.iter_mut())
        .find(|s| s.name() == name)
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
