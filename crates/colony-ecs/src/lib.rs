//! `colony-ecs` — the shared-mutable-state boundary of the simulation.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                     |
//! |-------------|--------------------------------------------------------------|
//! | [`store`]   | `Component`/`Flag` bounds, `ComponentStore<T>`, `ErasedStore` |
//! | [`world`]   | `World`: entity allocator, component stores, flag stores     |
//! | [`builder`] | `WorldBuilder`: the explicit type manifest                   |
//! | [`query`]   | `ComponentSet`: tuple type lists for intersection queries    |
//! | [`system`]  | `System` trait (three-phase lifecycle), `Access` declaration |
//! | [`error`]   | `EcsError`, `EcsResult<T>`                                   |
//!
//! # Concurrency model
//!
//! Every component type and every flag type has its own concurrent map, so
//! writers of different types never contend and there is no global lock.
//! The flip side: two components of the same entity read in the same tick may
//! come from different "generations" if different systems are writing them
//! concurrently.  Systems must be written so that this yields stale, never
//! corrupt, results.
//!
//! All `World` methods take `&self`; share the world across workers by
//! reference.

pub mod builder;
pub mod error;
pub mod query;
pub mod store;
pub mod system;
pub mod world;


pub use builder::WorldBuilder;
pub use error::{EcsError, EcsResult, StoreKind};
pub use query::ComponentSet;
pub use store::{Component, ComponentStore, ErasedStore, Flag};
pub use system::{Access, System};
pub use world::World;
