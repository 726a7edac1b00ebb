//! `colony-fsm` — per-agent finite-state machines and their tick bundles.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                         |
//! |-------------|------------------------------------------------------------------|
//! | [`actions`] | `BehaviorActions`: main / parallel / transition buckets          |
//! | [`state`]   | `State` trait with a per-state `Params` type                     |
//! | [`fsm`]     | `Fsm<S, F>`: transition table, forced transitions, observers     |
//! | [`batch`]   | `tick_batch`: tick many machines with shared parallel phases     |
//! | [`error`]   | `FsmError`, `FsmResult<T>`                                       |
//!
//! # Tick model
//!
//! Each tick the current state produces a [`BehaviorActions`] bundle from a
//! fresh parameter snapshot.  Main-bucket actions run single-threaded in
//! ascending order; parallel-bucket groups run concurrently within a group;
//! finally the transition check may raise one signal, which goes through
//! [`Fsm::send_input`].
//!
//! Actions usually capture handles to the agent's entity.  The entity may be
//! removed mid-tick, so actions must check it still exists and do nothing if
//! it does not.

pub mod actions;
pub mod batch;
pub mod error;
pub mod fsm;
pub mod state;


pub use actions::{Action, BehaviorActions, TransitionCheck};
pub use batch::tick_batch;
pub use error::{FsmError, FsmResult};
pub use fsm::{Effect, Fsm, Key, ObserverId, StateChange};
pub use state::State;
