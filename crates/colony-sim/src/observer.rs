//! Scheduler observer trait for progress reporting and data collection.

use std::time::Duration;

use colony_core::Tick;

/// Callbacks invoked by [`Scheduler::run`][crate::Scheduler::run] and
/// [`Scheduler::run_ticks`][crate::Scheduler::run_ticks] at tick boundaries.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: slow-tick logger
///
/// ```rust,ignore
/// struct SlowTicks { budget: Duration }
///
/// impl SimObserver for SlowTicks {
///     fn on_tick_end(&mut self, tick: Tick, elapsed: Duration) {
///         if elapsed > self.budget {
///             tracing::warn!(%tick, ?elapsed, "tick over budget");
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called before any stage runs.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after every stage and the orphan sweep.  `elapsed` is wall
    /// time spent on the tick.
    fn on_tick_end(&mut self, _tick: Tick, _elapsed: Duration) {}

    /// Called once after the final tick of [`Scheduler::run`][crate::Scheduler::run].
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
