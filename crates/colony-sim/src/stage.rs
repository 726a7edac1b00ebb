//! A stage is a named group of systems with one execution policy.

use colony_ecs::{System, World};
use rayon::prelude::*;

/// How the systems of one stage are dispatched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StageKind {
    /// Every system runs through its three phases concurrently with the
    /// others.  Use only for systems with disjoint write sets.
    Parallel,
    /// Systems run one after another in registration order.  Use when each
    /// system consumes what the previous one wrote.
    Sequential,
}

pub struct Stage {
    pub(crate) name:    String,
    pub(crate) kind:    StageKind,
    pub(crate) systems: Vec<Box<dyn System>>,
}

impl Stage {
    pub fn new(name: impl Into<String>, kind: StageKind, systems: Vec<Box<dyn System>>) -> Self {
        Self { name: name.into(), kind, systems }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn system_names(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().map(|s| s.name())
    }

    /// Pairs of systems in a parallel stage whose declared access overlaps
    /// on a written type.  Always empty for sequential stages.
    pub fn conflicts(&self) -> Vec<(String, String)> {
        if self.kind == StageKind::Sequential {
            return Vec::new();
        }
        let access: Vec<_> = self.systems.iter().map(|s| (s.name(), s.access())).collect();
        let mut out = Vec::new();
        for (i, (a, acc_a)) in access.iter().enumerate() {
            for (b, acc_b) in &access[i + 1..] {
                if acc_a.conflicts_with(acc_b) {
                    out.push(((*a).to_owned(), (*b).to_owned()));
                }
            }
        }
        out
    }

    pub(crate) fn run(&mut self, world: &World, dt: f32) {
        let _span = tracing::debug_span!("stage", name = %self.name).entered();
        match self.kind {
            StageKind::Sequential => {
                for system in &mut self.systems {
                    system.run(world, dt);
                }
            }
            StageKind::Parallel => {
                self.systems.par_iter_mut().for_each(|system| system.run(world, dt));
            }
        }
    }
}
