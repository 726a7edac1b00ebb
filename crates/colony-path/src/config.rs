/// Tuning knobs for the pathfinding service.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PathfindingConfig {
    /// A node with strictly more neighbours than this has them relaxed in
    /// parallel.  Default: 6.
    pub parallel_neighbor_threshold: usize,

    /// Pre-allocated open-set capacity per search.  Default: 1024.
    pub initial_queue_capacity: usize,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self { parallel_neighbor_threshold: 6, initial_queue_capacity: 1024 }
    }
}
