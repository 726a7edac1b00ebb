//! `colony-sim` — staged system scheduler for the colony simulation substrate.
//!
//! # Tick loop
//!
//! ```text
//! for tick in clock.current_tick..config.end_tick():
//!   observer.on_tick_start(tick)
//!   for stage in stages:                 (registration order)
//!     Sequential → for system: pre_execute, execute, post_execute
//!     Parallel   → every system's three phases at once on the pool
//!   world.sweep_orphans()                (if config.sweep_orphans)
//!   clock.advance()
//!   observer.on_tick_end(tick, elapsed)
//! observer.on_sim_end(final_tick)
//! ```
//!
//! Systems are initialized on the first tick (or an explicit
//! [`Scheduler::initialize`]) and deinitialized by [`Scheduler::shutdown`]
//! or when the scheduler is dropped.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use colony_core::SimConfig;
//! use colony_ecs::WorldBuilder;
//! use colony_sim::{NoopObserver, SchedulerBuilder};
//!
//! let world = colony_flock::register(WorldBuilder::new()).build();
//! let mut sched = SchedulerBuilder::new(world, SimConfig::default())
//!     .sequential("flock", colony_flock::flocking_systems())
//!     .build()?;
//! sched.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod scheduler;
pub mod stage;


pub use builder::SchedulerBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use scheduler::Scheduler;
pub use stage::{Stage, StageKind};
