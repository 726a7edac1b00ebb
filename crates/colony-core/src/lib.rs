//! `colony-core` — foundational types for the colony simulation substrate.
//!
//! This crate is a dependency of every other `colony-*` crate.  It has no
//! `colony-*` dependencies and only small external ones (`rand`, `bitflags`,
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `EntityId`, `GraphId`                                 |
//! | [`geo`]         | `Coord` (grid cell), `Vec2` (continuous position)     |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`rng`]         | `SimRng` (seeded, deterministic)                      |
//! | [`flags`]       | `UnitFlags` capability bitmask                        |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod flags;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use flags::UnitFlags;
pub use geo::{Coord, Vec2};
pub use ids::{EntityId, GraphId};
pub use rng::SimRng;
pub use time::{SimClock, SimConfig, Tick};
