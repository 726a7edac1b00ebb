//! `BehaviorActions` — one state's work for one tick, split by thread safety.
//!
//! | Bucket       | Runs                                                          |
//! |--------------|---------------------------------------------------------------|
//! | main         | On the calling thread, ascending order key, insertion order within a key |
//! | parallel     | Groups in ascending order key; actions inside a group concurrently on rayon |
//! | transition   | Last; returns at most one signal for the state machine        |
//!
//! An action goes in exactly one bucket.  Anything touching state that is not
//! safe under concurrent access belongs in `main`.

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;

/// A deferred unit of work.
pub type Action = Box<dyn FnOnce() + Send>;

/// Inspects conditions after the tick's actions ran and names at most one
/// input signal.
pub type TransitionCheck<F> = Box<dyn FnOnce() -> Option<F> + Send>;

pub struct BehaviorActions<F> {
    pub(crate) main:       BTreeMap<i32, Vec<Action>>,
    pub(crate) parallel:   BTreeMap<i32, Vec<Action>>,
    pub(crate) transition: Option<TransitionCheck<F>>,
}

impl<F> Default for BehaviorActions<F> {
    fn default() -> Self {
        Self { main: BTreeMap::new(), parallel: BTreeMap::new(), transition: None }
    }
}

impl<F> BehaviorActions<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` for the controlling thread at position `order`.
    pub fn add_main(&mut self, order: i32, action: impl FnOnce() + Send + 'static) -> &mut Self {
        self.main.entry(order).or_default().push(Box::new(action));
        self
    }

    /// Queue `action` in concurrent group `order`.
    pub fn add_parallel(&mut self, order: i32, action: impl FnOnce() + Send + 'static) -> &mut Self {
        self.parallel.entry(order).or_default().push(Box::new(action));
        self
    }

    /// Replace the transition check.
    pub fn set_transition(&mut self, check: impl FnOnce() -> Option<F> + Send + 'static) -> &mut Self {
        self.transition = Some(Box::new(check));
        self
    }

    pub fn main_len(&self) -> usize {
        self.main.values().map(Vec::len).sum()
    }

    pub fn parallel_len(&self) -> usize {
        self.parallel.values().map(Vec::len).sum()
    }

    pub fn has_transition(&self) -> bool {
        self.transition.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_empty() && self.parallel.is_empty() && self.transition.is_none()
    }

    /// Run the main bucket, then the parallel groups, then the transition
    /// check.  Returns the raised signal, if any.
    pub fn execute(mut self) -> Option<F> {
        self.run_main();
        self.run_parallel();
        self.evaluate()
    }

    pub(crate) fn run_main(&mut self) {
        for action in std::mem::take(&mut self.main).into_values().flatten() {
            action();
        }
    }

    pub(crate) fn run_parallel(&mut self) {
        run_groups(std::mem::take(&mut self.parallel));
    }

    pub(crate) fn evaluate(&mut self) -> Option<F> {
        self.transition.take().and_then(|check| check())
    }
}

/// Run each group in ascending key order; actions within a group run
/// concurrently and the next group starts only when the current one is done.
pub(crate) fn run_groups(groups: BTreeMap<i32, Vec<Action>>) {
    for (_, group) in groups {
        if group.len() == 1 {
            group.into_iter().for_each(|action| action());
        } else {
            group.into_par_iter().for_each(|action| action());
        }
    }
}

impl<F> fmt::Debug for BehaviorActions<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorActions")
            .field("main", &self.main_len())
            .field("parallel", &self.parallel_len())
            .field("transition", &self.has_transition())
            .finish()
    }
}
