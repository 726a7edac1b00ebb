//! `World` — the entity allocator plus every component and flag store.
//!
//! # Concurrency
//!
//! All methods take `&self`.  Entity bookkeeping lives in one `DashMap` of
//! per-entity records; each component or flag type has its own store.  Lock
//! order is always record first, then store, so writers never deadlock
//! against each other.
//!
//! The closure-taking accessors (`with_component`, `with_component_mut`)
//! run while a store shard is locked.  Do not call back into the world from
//! inside those closures.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use colony_core::EntityId;
use dashmap::DashMap;
use rayon::prelude::*;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};

use crate::error::{EcsError, EcsResult, StoreKind};
use crate::query::ComponentSet;
use crate::store::{Component, ComponentStore, ErasedStore, Flag};

pub(crate) type Registry = FxHashMap<TypeId, Box<dyn ErasedStore>>;

/// Which types an entity currently holds.
#[derive(Default, Debug)]
struct EntityRecord {
    components: FxHashSet<TypeId>,
    flags:      FxHashSet<TypeId>,
}

impl EntityRecord {
    fn types_mut(&mut self, kind: StoreKind) -> &mut FxHashSet<TypeId> {
        match kind {
            StoreKind::Component => &mut self.components,
            StoreKind::Flag => &mut self.flags,
        }
    }

    fn types(&self, kind: StoreKind) -> &FxHashSet<TypeId> {
        match kind {
            StoreKind::Component => &self.components,
            StoreKind::Flag => &self.flags,
        }
    }
}

/// An isolated simulation world.
///
/// Built by [`WorldBuilder`][crate::WorldBuilder]; the set of hosted types is
/// fixed at construction.
pub struct World {
    next_id:    AtomicU32,
    entities:   DashMap<EntityId, EntityRecord, FxBuildHasher>,
    components: Registry,
    flags:      Registry,
}

impl World {
    pub(crate) fn from_registries(components: Registry, flags: Registry) -> Self {
        Self {
            next_id: AtomicU32::new(0),
            entities: DashMap::with_hasher(FxBuildHasher),
            components,
            flags,
        }
    }

    // ── Entities ──────────────────────────────────────────────────────────

    /// Allocate a fresh, never-reused entity id.
    pub fn create_entity(&self) -> EntityId {
        let id = EntityId(self.next_id.fetch_add(1, Ordering::Relaxed));
        debug_assert!(id.is_valid(), "entity id space exhausted");
        self.entities.insert(id, EntityRecord::default());
        id
    }

    pub fn contains_entity(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Every live entity, ascending.
    pub fn entity_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.entities.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// Destroy `entity` and everything stored under it.
    ///
    /// The record goes first, so no concurrent `add_*` can attach new data
    /// afterwards; then every store drops its entry.
    pub fn remove_entity(&self, entity: EntityId) -> EcsResult<()> {
        if self.entities.remove(&entity).is_none() {
            return Err(EcsError::EntityNotFound(entity));
        }
        let removed = self
            .components
            .values()
            .chain(self.flags.values())
            .filter(|store| store.remove_entity(entity))
            .count();
        tracing::trace!(%entity, removed, "entity removed");
        Ok(())
    }

    /// Drop store entries whose owner no longer exists.  Returns how many
    /// entries were removed; normally zero.
    pub fn sweep_orphans(&self) -> usize {
        let alive = |id: EntityId| self.entities.contains_key(&id);
        let mut removed = 0;
        for store in self.components.values().chain(self.flags.values()) {
            let n = store.retain_alive(&alive);
            if n > 0 {
                tracing::warn!(store = store.type_name(), n, "swept orphaned entries");
            }
            removed += n;
        }
        removed
    }

    // ── Components ────────────────────────────────────────────────────────

    /// Attach `value` to `entity`, overwriting any existing `T`.
    pub fn add_component<T: Component>(&self, entity: EntityId, value: T) -> EcsResult<()> {
        self.insert_in(StoreKind::Component, entity, value)
    }

    /// The live store for `T`, for in-place reads and mutation.
    pub fn component_store<T: Component>(&self) -> EcsResult<&ComponentStore<T>> {
        store_in::<T>(&self.components, StoreKind::Component)
    }

    /// Snapshot of every `T` in the world.
    pub fn get_components<T: Component + Clone>(&self) -> EcsResult<HashMap<EntityId, T>> {
        Ok(self.component_store::<T>()?.snapshot())
    }

    /// Clone of `entity`'s `T`.
    pub fn component<T: Component + Clone>(&self, entity: EntityId) -> EcsResult<T> {
        self.with_component(entity, T::clone)
    }

    pub fn with_component<T: Component, R>(
        &self,
        entity: EntityId,
        f: impl FnOnce(&T) -> R,
    ) -> EcsResult<R> {
        let store = self.component_store::<T>()?;
        match store.get(entity) {
            Some(guard) => Ok(f(&guard)),
            None => Err(self.absent::<T>(entity, StoreKind::Component)),
        }
    }

    pub fn with_component_mut<T: Component, R>(
        &self,
        entity: EntityId,
        f: impl FnOnce(&mut T) -> R,
    ) -> EcsResult<R> {
        let store = self.component_store::<T>()?;
        match store.get_mut(entity) {
            Some(mut guard) => Ok(f(&mut guard)),
            None => Err(self.absent::<T>(entity, StoreKind::Component)),
        }
    }

    /// `false` for unknown entities and unregistered types alike.
    pub fn contains_component<T: Component>(&self, entity: EntityId) -> bool {
        self.component_store::<T>().is_ok_and(|s| s.contains(entity))
    }

    /// Detach `T` from `entity`, returning it if present.
    pub fn remove_component<T: Component>(&self, entity: EntityId) -> EcsResult<Option<T>> {
        self.remove_in::<T>(StoreKind::Component, entity)
    }

    /// Entities holding every type in `Q`, ascending.
    ///
    /// Filters all live entities in parallel against their type records.
    pub fn entities_with<Q: ComponentSet>(&self) -> EcsResult<Vec<EntityId>> {
        self.intersect::<Q>(StoreKind::Component)
    }

    // ── Flags ─────────────────────────────────────────────────────────────

    pub fn add_flag<F: Flag>(&self, entity: EntityId, flag: F) -> EcsResult<()> {
        self.insert_in(StoreKind::Flag, entity, flag)
    }

    pub fn flag_store<F: Flag>(&self) -> EcsResult<&ComponentStore<F>> {
        store_in::<F>(&self.flags, StoreKind::Flag)
    }

    pub fn get_flags<F: Flag + Clone>(&self) -> EcsResult<HashMap<EntityId, F>> {
        Ok(self.flag_store::<F>()?.snapshot())
    }

    pub fn flag<F: Flag + Clone>(&self, entity: EntityId) -> EcsResult<F> {
        let store = self.flag_store::<F>()?;
        match store.get(entity) {
            Some(guard) => Ok(F::clone(&guard)),
            None => Err(self.absent::<F>(entity, StoreKind::Flag)),
        }
    }

    pub fn has_flag<F: Flag>(&self, entity: EntityId) -> bool {
        self.flag_store::<F>().is_ok_and(|s| s.contains(entity))
    }

    pub fn remove_flag<F: Flag>(&self, entity: EntityId) -> EcsResult<Option<F>> {
        self.remove_in::<F>(StoreKind::Flag, entity)
    }

    pub fn entities_with_flags<Q: ComponentSet>(&self) -> EcsResult<Vec<EntityId>> {
        self.intersect::<Q>(StoreKind::Flag)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn registry(&self, kind: StoreKind) -> &Registry {
        match kind {
            StoreKind::Component => &self.components,
            StoreKind::Flag => &self.flags,
        }
    }

    fn insert_in<T: Component>(&self, kind: StoreKind, entity: EntityId, value: T) -> EcsResult<()> {
        let store = store_in::<T>(self.registry(kind), kind)?;
        // Holding the record guard across the insert keeps `remove_entity`
        // from slipping in between.
        let mut record = self
            .entities
            .get_mut(&entity)
            .ok_or(EcsError::EntityNotFound(entity))?;
        store.insert(entity, value);
        record.types_mut(kind).insert(TypeId::of::<T>());
        Ok(())
    }

    fn remove_in<T: Component>(&self, kind: StoreKind, entity: EntityId) -> EcsResult<Option<T>> {
        let store = store_in::<T>(self.registry(kind), kind)?;
        let mut record = self
            .entities
            .get_mut(&entity)
            .ok_or(EcsError::EntityNotFound(entity))?;
        record.types_mut(kind).remove(&TypeId::of::<T>());
        Ok(store.remove(entity))
    }

    fn intersect<Q: ComponentSet>(&self, kind: StoreKind) -> EcsResult<Vec<EntityId>> {
        let wanted = Q::type_ids();
        let registry = self.registry(kind);
        for (tid, type_name) in wanted.iter().zip(Q::type_names()) {
            if !registry.contains_key(tid) {
                return Err(EcsError::NoSuchStore { kind, type_name });
            }
        }
        Ok(self
            .entity_ids()
            .into_par_iter()
            .filter(|id| {
                self.entities.get(id).is_some_and(|record| {
                    let held = record.types(kind);
                    wanted.iter().all(|t| held.contains(t))
                })
            })
            .collect())
    }

    fn absent<T>(&self, entity: EntityId, kind: StoreKind) -> EcsError {
        if self.contains_entity(entity) {
            EcsError::missing::<T>(entity, kind)
        } else {
            EcsError::EntityNotFound(entity)
        }
    }
}

fn store_in<T: Component>(registry: &Registry, kind: StoreKind) -> EcsResult<&ComponentStore<T>> {
    registry
        .get(&TypeId::of::<T>())
        .and_then(|store| store.as_any().downcast_ref::<ComponentStore<T>>())
        .ok_or_else(|| EcsError::no_such_store::<T>(kind))
}
