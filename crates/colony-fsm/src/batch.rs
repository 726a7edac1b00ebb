//! Ticking many agents' state machines together.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::actions::{Action, run_groups};
use crate::fsm::{Fsm, Key};
use crate::FsmResult;

/// Tick every machine in `fsms` as one batch.
///
/// 1. Every agent's bundle is produced in parallel.
/// 2. Main buckets run on the calling thread, agent by agent in slice order,
///    each in ascending order key.
/// 3. Parallel groups from all agents are merged by order key and each merged
///    group runs concurrently; groups run in ascending key order.
/// 4. Transition checks run in slice order and feed `send_input`.
///
/// The result for each machine is what [`Fsm::tick`] would have returned.
pub fn tick_batch<S: Key, F: Key>(fsms: &mut [Fsm<S, F>]) -> Vec<FsmResult<bool>> {
    let mut bundles: Vec<_> = fsms.par_iter_mut().map(|fsm| fsm.produce()).collect();

    for bundle in bundles.iter_mut().flatten() {
        bundle.run_main();
    }

    let mut merged: BTreeMap<i32, Vec<Action>> = BTreeMap::new();
    for bundle in bundles.iter_mut().flatten() {
        for (order, group) in std::mem::take(&mut bundle.parallel) {
            merged.entry(order).or_default().extend(group);
        }
    }
    run_groups(merged);

    let mut fired = 0usize;
    let results: Vec<FsmResult<bool>> = fsms
        .iter_mut()
        .zip(bundles)
        .map(|(fsm, bundle)| {
            let signal = bundle?.evaluate();
            let changed = signal.is_some_and(|s| fsm.send_input(s));
            fired += usize::from(changed);
            Ok(changed)
        })
        .collect();
    tracing::trace!(agents = fsms.len(), fired, "fsm batch ticked");
    results
}
