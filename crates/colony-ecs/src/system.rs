//! The `System` trait — a unit of per-tick logic over queried entities.

use std::fmt;

use crate::{EcsResult, World};

/// Per-tick logic with a fixed three-phase lifecycle.
///
/// The scheduler calls [`initialize`][Self::initialize] once, then every tick
/// [`pre_execute`][Self::pre_execute] → [`execute`][Self::execute] →
/// [`post_execute`][Self::post_execute] with the same `dt`, and finally
/// [`deinitialize`][Self::deinitialize] on shutdown.
///
/// Only `name` and `execute` are required.
///
/// # Thread safety
///
/// Systems in a parallel stage run on different workers at once, so they must
/// be `Send`.  A system may fan its own entity loop out with rayon; the world
/// is shared by reference.
///
/// # Data access
///
/// A system should only touch the component types listed in its
/// [`access`][Self::access] declaration.  Nothing enforces this; the
/// declaration is logged at initialization so overlapping writers in one
/// parallel stage are easy to spot.
///
/// # Example
///
/// ```rust,ignore
/// struct Decay;
///
/// impl System for Decay {
///     fn name(&self) -> &str { "decay" }
///
///     fn access(&self) -> Access { Access::new().writes::<Health>() }
///
///     fn execute(&mut self, world: &World, dt: f32) {
///         if let Ok(store) = world.component_store::<Health>() {
///             store.par_for_each_mut(|_, h| h.0 -= dt);
///         }
///     }
/// }
/// ```
pub trait System: Send {
    fn name(&self) -> &str;

    /// Declared read/write component set.  Default: empty.
    fn access(&self) -> Access {
        Access::default()
    }

    /// Called once before the first tick.  An error aborts scheduler start-up.
    fn initialize(&mut self, _world: &World) -> EcsResult<()> {
        Ok(())
    }

    /// Gather work for this tick.
    fn pre_execute(&mut self, _world: &World, _dt: f32) {}

    fn execute(&mut self, world: &World, dt: f32);

    /// Publish results and drop per-tick scratch state.
    fn post_execute(&mut self, _world: &World, _dt: f32) {}

    /// Release anything cached since `initialize`.
    fn deinitialize(&mut self, _world: &World) {}

    /// Run all three per-tick phases in order.
    fn run(&mut self, world: &World, dt: f32) {
        self.pre_execute(world, dt);
        self.execute(world, dt);
        self.post_execute(world, dt);
    }
}

// ── Access ────────────────────────────────────────────────────────────────────

/// Documented read and write sets of a system, by type name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Access {
    reads:  Vec<&'static str>,
    writes: Vec<&'static str>,
}

impl Access {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads<T: 'static>(mut self) -> Self {
        push_unique(&mut self.reads, std::any::type_name::<T>());
        self
    }

    pub fn writes<T: 'static>(mut self) -> Self {
        push_unique(&mut self.writes, std::any::type_name::<T>());
        self
    }

    pub fn read_set(&self) -> &[&'static str] {
        &self.reads
    }

    pub fn write_set(&self) -> &[&'static str] {
        &self.writes
    }

    /// `true` if either side writes a type the other reads or writes.
    pub fn conflicts_with(&self, other: &Access) -> bool {
        let touches = |a: &Access, name: &str| a.reads.iter().chain(&a.writes).any(|t| *t == name);
        self.writes.iter().any(|w| touches(other, w))
            || other.writes.iter().any(|w| touches(self, w))
    }
}

fn push_unique(set: &mut Vec<&'static str>, name: &'static str) {
    if !set.contains(&name) {
        set.push(name);
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reads [{}] writes [{}]", self.reads.join(", "), self.writes.join(", "))
    }
}
