//! Explicit type manifest for a [`World`].
//!
//! # Usage
//!
//! ```rust
//! use colony_ecs::WorldBuilder;
//!
//! #[derive(Clone)]
//! struct Health(f32);
//! #[derive(Clone)]
//! struct Herbivore;
//!
//! let world = WorldBuilder::new()
//!     .register_component::<Health>()
//!     .register_flag::<Herbivore>()
//!     .build();
//!
//! let e = world.create_entity();
//! world.add_component(e, Health(1.0)).unwrap();
//! assert!(world.contains_component::<Health>(e));
//! ```

use std::any::TypeId;

use crate::store::{Component, ComponentStore, Flag};
use crate::world::{Registry, World};

/// Lists every component and flag type a [`World`] will host.
///
/// Types not registered here have no store; touching them through the world
/// yields [`EcsError::NoSuchStore`][crate::EcsError::NoSuchStore].
#[derive(Default)]
pub struct WorldBuilder {
    components: Registry,
    flags:      Registry,
}

impl WorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register component type `T`.  Calling this twice for the same `T` is
    /// a no-op.
    pub fn register_component<T: Component>(mut self) -> Self {
        self.components
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentStore::<T>::new()));
        self
    }

    /// Register flag type `F`.  Calling this twice for the same `F` is a
    /// no-op.
    pub fn register_flag<F: Flag>(mut self) -> Self {
        self.flags
            .entry(TypeId::of::<F>())
            .or_insert_with(|| Box::new(ComponentStore::<F>::new()));
        self
    }

    pub fn build(self) -> World {
        tracing::debug!(
            components = self.components.len(),
            flags = self.flags.len(),
            "world built"
        );
        World::from_registries(self.components, self.flags)
    }
}
