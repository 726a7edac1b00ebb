//! Pathfinding error type.

use colony_core::{Coord, GraphId};
use colony_ecs::EcsError;
use thiserror::Error;

/// Errors produced by `colony-path`.
///
/// Only `InvalidAdjacency` signals a programming error; the rest are
/// ordinary "absent" outcomes.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("no path from {from} to {to}")]
    Unreachable { from: Coord, to: Coord },

    #[error("{to} is not a neighbour of {from}")]
    InvalidAdjacency { from: Coord, to: Coord },

    #[error("{0} is outside the graph")]
    OutOfBounds(Coord),

    #[error("no graph registered as {0}")]
    UnknownGraph(GraphId),

    #[error(transparent)]
    Ecs(#[from] EcsError),
}

pub type PathfindingResult<T> = Result<T, PathError>;
