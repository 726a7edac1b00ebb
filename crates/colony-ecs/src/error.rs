use std::fmt;

use colony_core::EntityId;
use thiserror::Error;

/// Which family of store a lookup went to.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum StoreKind {
    Component,
    Flag,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Component => f.write_str("component"),
            StoreKind::Flag => f.write_str("flag"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EcsError {
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    #[error("no {kind} store registered for `{type_name}`")]
    NoSuchStore {
        kind:      StoreKind,
        type_name: &'static str,
    },

    #[error("entity {entity} has no {kind} `{type_name}`")]
    Missing {
        entity:    EntityId,
        kind:      StoreKind,
        type_name: &'static str,
    },
}

impl EcsError {
    pub(crate) fn no_such_store<T>(kind: StoreKind) -> Self {
        EcsError::NoSuchStore { kind, type_name: std::any::type_name::<T>() }
    }

    pub(crate) fn missing<T>(entity: EntityId, kind: StoreKind) -> Self {
        EcsError::Missing { entity, kind, type_name: std::any::type_name::<T>() }
    }

    /// `true` for the "absent" outcomes callers are expected to recover from.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EcsError::EntityNotFound(_) | EcsError::Missing { .. })
    }
}

pub type EcsResult<T> = Result<T, EcsError>;
