//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter plus a fixed step
//! `tick_dt_secs` handed to every system as `dt`.  Elapsed simulated time is
//! `tick * tick_dt_secs`; it is derived on demand rather than accumulated, so
//! no floating-point drift builds up over long runs.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tracks the current tick and the fixed step length.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Simulated seconds per tick; passed to systems as `dt`.
    pub tick_dt_secs: f32,
    /// The current tick, advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(tick_dt_secs: f32) -> Self {
        Self { tick_dt_secs, current_tick: Tick::ZERO }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.current_tick.0 as f64 * self.tick_dt_secs as f64
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}s)", self.current_tick, self.elapsed_secs())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically loaded from a TOML file by the application crate and passed to
/// the scheduler builder.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Simulated seconds per tick.  Default: 1/60.
    pub tick_dt_secs: f32,

    /// Total ticks `Scheduler::run` will execute.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical terrain.
    pub seed: u64,

    /// Worker thread count for the scheduler's rayon pool.  `None` uses all
    /// logical cores.
    pub num_threads: Option<usize>,

    /// Remove component/flag entries whose entity was destroyed while a
    /// concurrent write was in flight.  Runs once after every tick.
    pub sweep_orphans: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_dt_secs:  1.0 / 60.0,
            total_ticks:   600,
            seed:          0,
            num_threads:   None,
            sweep_orphans: true,
        }
    }
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_dt_secs)
    }

    /// Reject configurations the scheduler cannot run.
    pub fn validate(&self) -> crate::CoreResult<()> {
        if !(self.tick_dt_secs.is_finite() && self.tick_dt_secs > 0.0) {
            return Err(crate::CoreError::Config(format!(
                "tick_dt_secs must be a positive finite number, got {}",
                self.tick_dt_secs
            )));
        }
        if self.num_threads == Some(0) {
            return Err(crate::CoreError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }
}
