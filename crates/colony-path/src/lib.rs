//! `colony-path` — navigation graphs and the parallel A* pathfinding service.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                        |
//! |----------------|-----------------------------------------------------------------|
//! | [`queue`]      | `IndexedPriorityQueue`: min-heap with O(1) membership           |
//! | [`graph`]      | `GridGraph`, `GraphNode`, `NodeType`/`NodeTerrain`, `TraversalRules`, `GridGraphBuilder` |
//! | [`terrain`]    | Seeded random map generation on the builder                     |
//! | [`astar`]      | `PathSearch` trait, `AStar`, `find_path`, `find_path_traced`    |
//! | [`components`] | `PathRequest`, `PathResult`, `UnitFlag`, `GraphRouting`         |
//! | [`service`]    | `PathfinderSystem`, `request_path`, `poll_path_result`          |
//! | [`config`]     | `PathfindingConfig`                                             |
//! | [`error`]      | `PathError`, `PathfindingResult<T>`                             |
//!
//! # Request flow
//!
//! An agent calls [`request_path`], which writes a `PathRequest` component.
//! On the next scheduler tick [`PathfinderSystem`] picks up every
//! unprocessed request, searches them in parallel on the graph chosen by the
//! entity's `UnitFlag`, marks each request processed and writes a
//! `PathResult`.  The agent reads it back with [`poll_path_result`].

pub mod astar;
pub mod components;
pub mod config;
pub mod error;
pub mod graph;
pub mod queue;
pub mod service;
pub mod terrain;

#[cfg(test)]
mod tests;

pub use astar::{AStar, PathSearch, find_path, find_path_traced};
pub use components::{GraphRouting, PathRequest, PathResult, UnitFlag};
pub use config::PathfindingConfig;
pub use error::{PathError, PathfindingResult};
pub use graph::{GraphNode, GridGraph, GridGraphBuilder, NodeTerrain, NodeType, TraversalRules};
pub use queue::IndexedPriorityQueue;
pub use service::{BatchStats, PathfinderSystem, poll_path_result, request_path};
