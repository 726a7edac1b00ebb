//! `Fsm<S, F>` — a transition table over states `S` driven by signals `F`.
//!
//! # Transition order
//!
//! When [`send_input`][Fsm::send_input] matches a row for
//! `(current, signal)`:
//!
//! 1. the row's effect runs, once;
//! 2. the old state's exit bundle runs, still in the old state;
//! 3. the current-state pointer moves;
//! 4. the new state's enter bundle runs;
//! 5. observers are notified, once.
//!
//! An unmatched signal does nothing at all.
//!
//! [`force_transition`][Fsm::force_transition] only moves the pointer and
//! notifies.  It always notifies, even when forced to the state it is already
//! in, so owners can use it as a reset.

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::actions::BehaviorActions;
use crate::state::{Bound, BoundState, State};
use crate::{FsmError, FsmResult};

/// One-shot side effect attached to a transition row.
pub type Effect = Box<dyn FnMut() + Send>;

/// Bound shared by state and signal enums.
pub trait Key: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {}
impl<T: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static> Key for T {}

/// Delivered to observers after every state change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StateChange<S> {
    /// `None` on the very first forced transition.
    pub from:   Option<S>,
    pub to:     S,
    pub forced: bool,
}

/// Handle returned by [`Fsm::subscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

struct Row<S> {
    to:     S,
    effect: Option<Effect>,
}

pub struct Fsm<S, F> {
    current:       Option<S>,
    states:        FxHashMap<S, Box<dyn BoundState<F>>>,
    rows:          FxHashMap<(S, F), Row<S>>,
    observers:     Vec<(ObserverId, Box<dyn FnMut(StateChange<S>) + Send>)>,
    next_observer: u64,
}

impl<S: Key, F: Key> Default for Fsm<S, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Key, F: Key> Fsm<S, F> {
    pub fn new() -> Self {
        Self {
            current:       None,
            states:        FxHashMap::default(),
            rows:          FxHashMap::default(),
            observers:     Vec::new(),
            next_observer: 0,
        }
    }

    // ── Construction ──────────────────────────────────────────────────────

    /// Register `behaviour` for `state`, with `params` building its
    /// per-call parameters.  Re-registering a state replaces it.
    pub fn add_state<T, P>(&mut self, state: S, behaviour: T, params: P) -> &mut Self
    where
        T: State<F> + 'static,
        P: Fn() -> T::Params + Send + Sync + 'static,
    {
        self.states.insert(state, Box::new(Bound { state: behaviour, params }));
        self
    }

    /// Add or replace the row `(from, signal) → to`.
    pub fn set_transition(&mut self, from: S, signal: F, to: S, effect: Option<Effect>) -> &mut Self {
        self.rows.insert((from, signal), Row { to, effect });
        self
    }

    pub fn has_transition(&self, from: S, signal: F) -> bool {
        self.rows.contains_key(&(from, signal))
    }

    // ── Observers ─────────────────────────────────────────────────────────

    pub fn subscribe(&mut self, observer: impl FnMut(StateChange<S>) + Send + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // ── Driving ───────────────────────────────────────────────────────────

    pub fn current(&self) -> Option<S> {
        self.current
    }

    /// Set the state unconditionally.  No effect, no enter/exit bundles.
    pub fn force_transition(&mut self, state: S) {
        let from = self.current.replace(state);
        tracing::trace!(?from, to = ?state, "forced transition");
        self.notify(StateChange { from, to: state, forced: true });
    }

    /// Feed `signal` through the table.  Returns `true` if a row fired.
    pub fn send_input(&mut self, signal: F) -> bool {
        let Some(from) = self.current else {
            tracing::trace!(?signal, "input before start ignored");
            return false;
        };
        let Some(row) = self.rows.get_mut(&(from, signal)) else {
            return false;
        };
        let to = row.to;
        if let Some(effect) = row.effect.as_mut() {
            effect();
        }

        if let Some(exit) = self.states.get(&from).map(|s| s.on_exit()) {
            run_hook(exit);
        }
        self.current = Some(to);
        if let Some(enter) = self.states.get(&to).map(|s| s.on_enter()) {
            run_hook(enter);
        }

        tracing::trace!(?from, ?to, ?signal, "transition");
        self.notify(StateChange { from: Some(from), to, forced: false });
        true
    }

    /// Produce, execute and evaluate the current state's bundle.
    ///
    /// Returns `true` if the bundle's transition check raised a signal that
    /// fired a transition.
    pub fn tick(&mut self) -> FsmResult<bool> {
        let bundle = self.produce()?;
        Ok(match bundle.execute() {
            Some(signal) => self.send_input(signal),
            None => false,
        })
    }

    /// The current state's bundle for this tick, not yet executed.
    pub fn produce(&self) -> FsmResult<BehaviorActions<F>> {
        let current = self.current.ok_or(FsmError::NotStarted)?;
        let state = self
            .states
            .get(&current)
            .ok_or_else(|| FsmError::NoBehaviour { state: format!("{current:?}") })?;
        Ok(state.tick())
    }

    fn notify(&mut self, change: StateChange<S>) {
        for (_, observer) in &mut self.observers {
            observer(change);
        }
    }
}

/// Enter/exit bundles run their actions; their transition checks are dropped.
fn run_hook<F>(mut bundle: BehaviorActions<F>) {
    bundle.run_main();
    bundle.run_parallel();
}

impl<S: fmt::Debug, F> fmt::Debug for Fsm<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fsm")
            .field("current", &self.current)
            .field("states", &self.states.len())
            .field("rows", &self.rows.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}
