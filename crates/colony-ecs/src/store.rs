//! Type-erased, per-type concurrent storage.
//!
//! # Design
//!
//! Each component (or flag) type `T` is stored as a sparse
//! `DashMap<EntityId, T>` inside a [`ComponentStore<T>`], kept behind a
//! `Box<dyn ErasedStore>` in the world's `TypeId`-keyed registry.  The
//! erased trait carries only what the world needs without knowing `T`:
//! removing an entity, orphan sweeps, and counts.
//!
//! Inserting and removing go through [`World`][crate::World] so that the
//! entity's type set stays in step with the stores; the store itself only
//! exposes reads and in-place mutation publicly.

use std::any::Any;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use colony_core::EntityId;
use dashmap::DashMap;
use rayon::prelude::*;
use rustc_hash::FxBuildHasher;

/// Bound for per-entity data records.
///
/// Blanket-implemented: any `Send + Sync + 'static` type can be a component
/// once it is listed in the world's manifest.
pub trait Component: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Component for T {}

/// Bound for per-entity classification markers.  Same shape as
/// [`Component`]; flags just live in a separate registry.
pub trait Flag: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Flag for T {}

// ── Trait object ──────────────────────────────────────────────────────────────

/// Type-erased interface over a `ComponentStore<T>`.
///
/// Sealed: the world relies on every erased store being a `ComponentStore`.
pub trait ErasedStore: Send + Sync + 'static + sealed::Sealed {
    /// Drop the entry for `entity`, if any.  Returns `true` if one existed.
    fn remove_entity(&self, entity: EntityId) -> bool;

    /// Drop every entry whose owner fails `alive`.  Returns how many went.
    fn retain_alive(&self, alive: &dyn Fn(EntityId) -> bool) -> usize;

    fn contains(&self, entity: EntityId) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the stored type, for logs and errors.
    fn type_name(&self) -> &'static str;

    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;
}

mod sealed {
    pub trait Sealed {}
}

// ── Concrete store ────────────────────────────────────────────────────────────

/// Sparse concurrent map from entity to one `T`.
///
/// At most one `T` per entity: inserting again overwrites.
pub struct ComponentStore<T: Component> {
    map: DashMap<EntityId, T, FxBuildHasher>,
}

impl<T: Component> sealed::Sealed for ComponentStore<T> {}

impl<T: Component> ErasedStore for ComponentStore<T> {
    fn remove_entity(&self, entity: EntityId) -> bool {
        self.map.remove(&entity).is_some()
    }

    fn retain_alive(&self, alive: &dyn Fn(EntityId) -> bool) -> usize {
        let before = self.map.len();
        self.map.retain(|id, _| alive(*id));
        before.saturating_sub(self.map.len())
    }

    fn contains(&self, entity: EntityId) -> bool {
        self.map.contains_key(&entity)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Component> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStore<T> {
    pub fn new() -> Self {
        Self { map: DashMap::with_hasher(FxBuildHasher) }
    }

    /// Insert or overwrite `entity`'s value, returning the previous one.
    pub(crate) fn insert(&self, entity: EntityId, value: T) -> Option<T> {
        self.map.insert(entity, value)
    }

    pub(crate) fn remove(&self, entity: EntityId) -> Option<T> {
        self.map.remove(&entity).map(|(_, v)| v)
    }

    // ── Read access ───────────────────────────────────────────────────────

    /// Shared guard on `entity`'s value.
    ///
    /// The guard holds a shard read lock; drop it before writing to the same
    /// store from this thread.
    pub fn get(&self, entity: EntityId) -> Option<impl Deref<Target = T> + '_> {
        self.map.get(&entity)
    }

    /// Exclusive guard on `entity`'s value for in-place mutation.
    pub fn get_mut(&self, entity: EntityId) -> Option<impl DerefMut<Target = T> + '_> {
        self.map.get_mut(&entity)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.map.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Owners of every stored value, ascending.
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.map.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// Visit every `(entity, value)` pair.  Iteration order is unspecified.
    pub fn for_each(&self, mut f: impl FnMut(EntityId, &T)) {
        for entry in self.map.iter() {
            f(*entry.key(), entry.value());
        }
    }

    /// Mutate every value in parallel on the current rayon pool.
    ///
    /// Each value is locked only while its own closure runs.  Entries added
    /// concurrently may or may not be visited.
    pub fn par_for_each_mut<F>(&self, f: F)
    where
        F: Fn(EntityId, &mut T) + Send + Sync,
    {
        self.ids().par_iter().for_each(|&id| {
            if let Some(mut value) = self.map.get_mut(&id) {
                f(id, &mut value);
            }
        });
    }

    /// Point-in-time copy of the whole store.
    pub fn snapshot(&self) -> HashMap<EntityId, T>
    where
        T: Clone,
    {
        self.map
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect()
    }
}
