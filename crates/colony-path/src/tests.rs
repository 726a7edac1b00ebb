//! Unit tests for colony-path.

#[cfg(test)]
mod queue {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use crate::IndexedPriorityQueue;

    #[test]
    fn dequeues_in_priority_order() {
        let mut q = IndexedPriorityQueue::new();
        for (item, p) in [("c", 30), ("a", 10), ("d", 40), ("b", 20)] {
            q.enqueue(item, p);
        }
        let order: Vec<_> = std::iter::from_fn(|| q.dequeue()).map(|(i, _)| i).collect();
        assert_eq!(order, ["a", "b", "c", "d"]);
    }

    #[test]
    fn enqueue_existing_updates_instead_of_duplicating() {
        let mut q = IndexedPriorityQueue::new();
        q.enqueue(1u32, 50);
        q.enqueue(2u32, 40);
        q.enqueue(1u32, 5);
        assert_eq!(q.len(), 2);
        assert_eq!(q.priority(&1), Some(5));
        assert_eq!(q.dequeue(), Some((1, 5)));
        assert_eq!(q.dequeue(), Some((2, 40)));
        assert!(q.is_empty());
    }

    #[test]
    fn update_priority_moves_both_ways() {
        let mut q = IndexedPriorityQueue::new();
        for i in 0..8u32 {
            q.enqueue(i, i * 10);
        }
        assert!(q.update_priority(&7, 0));
        assert!(q.update_priority(&0, 100));
        assert!(!q.update_priority(&99, 1));
        assert_eq!(q.peek(), Some((&7, 0)));
        let last = std::iter::from_fn(|| q.dequeue()).last();
        assert_eq!(last, Some((0, 100)));
    }

    #[test]
    fn contains_tracks_membership() {
        let mut q = IndexedPriorityQueue::with_capacity(4);
        q.enqueue('x', 1);
        assert!(q.contains(&'x'));
        q.dequeue();
        assert!(!q.contains(&'x'));
        assert_eq!(q.dequeue(), None);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Enqueue(u8, u32),
        Update(u8, u32),
        Dequeue,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..32, 0u32..1000).prop_map(|(i, p)| Op::Enqueue(i, p)),
            (0u8..32, 0u32..1000).prop_map(|(i, p)| Op::Update(i, p)),
            Just(Op::Dequeue),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn heap_invariant_holds(ops in prop::collection::vec(op(), 0..200)) {
            let mut q = IndexedPriorityQueue::new();
            let mut model: HashMap<u8, u32> = HashMap::new();
            for op in ops {
                match op {
                    Op::Enqueue(i, p) => {
                        q.enqueue(i, p);
                        model.insert(i, p);
                    }
                    Op::Update(i, p) => {
                        let present = model.contains_key(&i);
                        prop_assert_eq!(q.update_priority(&i, p), present);
                        if present {
                            model.insert(i, p);
                        }
                    }
                    Op::Dequeue => match q.dequeue() {
                        Some((item, p)) => {
                            prop_assert_eq!(model.remove(&item), Some(p));
                            prop_assert!(model.values().all(|&rest| p <= rest));
                        }
                        None => prop_assert!(model.is_empty()),
                    },
                }
                prop_assert_eq!(q.len(), model.len());
                for i in 0u8..32 {
                    prop_assert_eq!(q.contains(&i), model.contains_key(&i));
                }
            }
        }
    }
}

#[cfg(test)]
mod graph {
    use colony_core::Coord;
    use rayon::prelude::*;

    use crate::{GridGraphBuilder, NodeTerrain, NodeType, PathError, TraversalRules};

    #[test]
    fn four_connected_degrees() {
        let g = GridGraphBuilder::new(5, 5).four_connected().build();
        assert_eq!(g.node(Coord::new(0, 0)).unwrap().neighbors().len(), 2);
        assert_eq!(g.node(Coord::new(2, 0)).unwrap().neighbors().len(), 3);
        assert_eq!(g.node(Coord::new(2, 2)).unwrap().neighbors().len(), 4);
        assert!(g.node(Coord::new(5, 0)).is_none());
    }

    #[test]
    fn eight_connected_interior_has_eight() {
        let g = GridGraphBuilder::new(3, 3).eight_connected().build();
        assert_eq!(g.node(Coord::new(1, 1)).unwrap().neighbors().len(), 8);
        assert_eq!(g.node(Coord::new(0, 0)).unwrap().neighbors().len(), 3);
    }

    #[test]
    fn step_cost_sums_both_ends() {
        let g = GridGraphBuilder::new(3, 1)
            .four_connected()
            .set_cost(Coord::new(1, 0), 5)
            .build();
        assert_eq!(g.step_cost(Coord::new(0, 0), Coord::new(1, 0)), 6);
        assert!(matches!(
            g.try_step_cost(Coord::new(0, 0), Coord::new(2, 0)),
            Err(PathError::InvalidAdjacency { .. })
        ));
        assert!(matches!(
            g.try_step_cost(Coord::new(0, 0), Coord::new(9, 0)),
            Err(PathError::OutOfBounds(_))
        ));
    }

    #[test]
    #[should_panic(expected = "not a neighbour")]
    fn step_cost_between_strangers_panics() {
        let g = GridGraphBuilder::new(3, 1).four_connected().build();
        g.step_cost(Coord::new(0, 0), Coord::new(2, 0));
    }

    #[test]
    fn cost_is_clamped_to_one() {
        let g = GridGraphBuilder::new(2, 1).set_cost(Coord::new(0, 0), 0).build();
        let n = g.node(Coord::new(0, 0)).unwrap();
        assert_eq!(n.cost(), 1);
        n.set_cost(0);
        assert_eq!(n.cost(), 1);
    }

    #[test]
    fn irregular_links() {
        let g = GridGraphBuilder::new(3, 3)
            .connect(Coord::new(0, 0), Coord::new(1, 1))
            .build();
        assert!(g.node(Coord::new(0, 0)).unwrap().is_neighbor(Coord::new(1, 1)));
        assert!(g.node(Coord::new(1, 1)).unwrap().is_neighbor(Coord::new(0, 0)));
        assert!(g.node(Coord::new(0, 1)).unwrap().neighbors().is_empty());
    }

    #[test]
    fn rules_make_types_impassable() {
        let mut rules = TraversalRules::uniform(1);
        rules.set(NodeType::Sand, None);
        let g = GridGraphBuilder::new(2, 1)
            .rules(rules)
            .node_type(Coord::new(1, 0), NodeType::Sand)
            .build();
        assert!(g.is_blocked(Coord::new(1, 0)));
        assert!(!g.is_blocked(Coord::new(0, 0)));
        assert!(g.is_blocked(Coord::new(-1, 0)));
    }

    #[test]
    fn default_rules_price_terrain() {
        let g = GridGraphBuilder::new(3, 1)
            .node_type(Coord::new(0, 0), NodeType::Mountain)
            .node_type(Coord::new(1, 0), NodeType::Lake)
            .build();
        assert_eq!(g.node(Coord::new(0, 0)).unwrap().cost(), 4);
        assert!(g.is_blocked(Coord::new(1, 0)));
        assert_eq!(g.node(Coord::new(2, 0)).unwrap().cost(), 1);
    }

    #[test]
    fn take_resource_never_goes_negative() {
        let g = GridGraphBuilder::new(1, 1)
            .terrain(Coord::new(0, 0), NodeTerrain::Stump, 100)
            .build();
        let node = g.node(Coord::new(0, 0)).unwrap();
        let taken: i32 = (0..400).into_par_iter().map(|_| node.take_resource(1)).sum();
        assert_eq!(taken, 100);
        assert_eq!(node.resource(), 0);
        assert_eq!(node.take_resource(5), 0);
    }

    #[test]
    fn obstacle_terrain_blocks() {
        let g = GridGraphBuilder::new(2, 1)
            .terrain(Coord::new(0, 0), NodeTerrain::Tree, 10)
            .terrain(Coord::new(1, 0), NodeTerrain::Stump, 0)
            .build();
        assert!(g.is_blocked(Coord::new(0, 0)));
        assert!(!g.is_blocked(Coord::new(1, 0)));
        assert_eq!(g.node(Coord::new(0, 0)).unwrap().terrain(), NodeTerrain::Tree);
    }

    #[test]
    fn random_terrain_is_seeded() {
        let types = |seed| {
            let g = GridGraphBuilder::new(40, 40).random_terrain(seed).build();
            g.nodes().map(|n| (n.node_type(), n.terrain())).collect::<Vec<_>>()
        };
        assert_eq!(types(7), types(7));
        assert_ne!(types(7), types(8));
    }

    #[test]
    fn random_terrain_counts() {
        let g = GridGraphBuilder::new(60, 60).random_terrain(3).build();
        let count = |t| g.nodes().filter(|n| n.terrain() == t).count();
        assert_eq!(count(NodeTerrain::Mine), crate::terrain::FEATURE_COUNT);
        assert_eq!(count(NodeTerrain::Tree), crate::terrain::FEATURE_COUNT);
        assert_eq!(count(NodeTerrain::Stump), crate::terrain::FEATURE_COUNT);
        let lakes = g.nodes().filter(|n| n.node_type() == NodeType::Lake).count();
        assert!(lakes <= crate::terrain::MAX_LAKES);
    }
}

#[cfg(test)]
mod astar {
    use colony_core::Coord;

    use crate::{GridGraph, GridGraphBuilder, PathError, PathfindingConfig, find_path, find_path_traced};

    fn open_grid(w: u32, h: u32) -> GridGraph {
        GridGraphBuilder::new(w, h).four_connected().build()
    }

    fn assert_walkable(g: &GridGraph, path: &[Coord]) {
        for pair in path.windows(2) {
            assert!(g.node(pair[0]).unwrap().is_neighbor(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        for c in &path[1..] {
            assert!(!g.is_blocked(*c), "path enters blocked {c}");
        }
    }

    #[test]
    fn corner_to_corner_is_manhattan_optimal() {
        let g = open_grid(10, 10);
        let mut popped = Vec::new();
        let path = find_path_traced(
            &g,
            Coord::new(0, 0),
            Coord::new(9, 9),
            &PathfindingConfig::default(),
            |_, f| popped.push(f),
        )
        .unwrap();
        assert_eq!(path.len(), 19);
        assert_eq!(path.first(), Some(&Coord::new(0, 0)));
        assert_eq!(path.last(), Some(&Coord::new(9, 9)));
        assert_walkable(&g, &path);
        assert!(popped.windows(2).all(|w| w[0] <= w[1]), "f went down: {popped:?}");
    }

    #[test]
    fn start_equals_destination() {
        let g = open_grid(3, 3);
        let c = Coord::new(1, 1);
        assert_eq!(find_path(&g, c, c, &PathfindingConfig::default()).unwrap(), vec![c]);
    }

    #[test]
    fn blocked_destination_uses_first_open_neighbour() {
        let dest = Coord::new(5, 5);
        let g = GridGraphBuilder::new(10, 10).four_connected().block(dest).build();
        let path = find_path(&g, Coord::new(0, 0), dest, &PathfindingConfig::default()).unwrap();
        assert_eq!(path.last(), Some(&Coord::new(4, 5)));

        let g = GridGraphBuilder::new(10, 10)
            .four_connected()
            .block(dest)
            .block(Coord::new(4, 5))
            .build();
        let path = find_path(&g, Coord::new(0, 0), dest, &PathfindingConfig::default()).unwrap();
        assert_eq!(path.last(), Some(&Coord::new(5, 4)));
        assert_walkable(&g, &path);
    }

    #[test]
    fn boxed_in_destination_is_unreachable() {
        let dest = Coord::new(5, 5);
        let mut b = GridGraphBuilder::new(10, 10).four_connected().block(dest);
        for c in [Coord::new(4, 5), Coord::new(5, 4), Coord::new(6, 5), Coord::new(5, 6)] {
            b = b.block(c);
        }
        let g = b.build();
        let err = find_path(&g, Coord::new(0, 0), dest, &PathfindingConfig::default()).unwrap_err();
        assert!(matches!(err, PathError::Unreachable { to, .. } if to == dest));
    }

    #[test]
    fn disconnected_graph_is_unreachable() {
        let mut b = GridGraphBuilder::new(10, 10).four_connected();
        for y in 0..10 {
            b = b.block(Coord::new(5, y));
        }
        let g = b.build();
        let err = find_path(&g, Coord::new(0, 0), Coord::new(9, 9), &PathfindingConfig::default());
        assert!(matches!(err, Err(PathError::Unreachable { .. })));
    }

    #[test]
    fn routes_around_a_wall() {
        let mut b = GridGraphBuilder::new(10, 10).four_connected();
        for y in 0..9 {
            b = b.block(Coord::new(5, y));
        }
        let g = b.build();
        let path = find_path(&g, Coord::new(0, 0), Coord::new(9, 0), &PathfindingConfig::default()).unwrap();
        assert!(path.contains(&Coord::new(5, 9)));
        assert_walkable(&g, &path);
    }

    #[test]
    fn prefers_cheap_nodes() {
        // Direct route across (1, 0) is expensive; detour via row 1 is cheaper.
        let g = GridGraphBuilder::new(3, 2)
            .four_connected()
            .set_cost(Coord::new(1, 0), 50)
            .build();
        let path = find_path(&g, Coord::new(0, 0), Coord::new(2, 0), &PathfindingConfig::default()).unwrap();
        assert!(!path.contains(&Coord::new(1, 0)));
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn parallel_and_sequential_expansion_agree() {
        let g = GridGraphBuilder::new(20, 20).eight_connected().build();
        let (s, d) = (Coord::new(0, 0), Coord::new(19, 19));
        let parallel = find_path(&g, s, d, &PathfindingConfig { parallel_neighbor_threshold: 6, ..Default::default() }).unwrap();
        let sequential = find_path(&g, s, d, &PathfindingConfig { parallel_neighbor_threshold: usize::MAX, ..Default::default() }).unwrap();
        assert_eq!(parallel.len(), 20);
        assert_eq!(sequential.len(), 20);
        assert_walkable(&g, &parallel);
    }

    #[test]
    fn out_of_bounds_is_reported() {
        let g = open_grid(4, 4);
        let err = find_path(&g, Coord::new(-1, 0), Coord::new(2, 2), &PathfindingConfig::default());
        assert!(matches!(err, Err(PathError::OutOfBounds(_))));
    }

    #[test]
    fn blocked_start_can_leave() {
        let start = Coord::new(0, 0);
        let g = GridGraphBuilder::new(4, 1).four_connected().block(start).build();
        let path = find_path(&g, start, Coord::new(3, 0), &PathfindingConfig::default()).unwrap();
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn huge_costs_saturate_instead_of_overflowing() {
        let g = open_grid(3, 1);
        let middle = Coord::new(1, 0);
        g.node(middle).unwrap().set_cost(u32::MAX / 2 + 10);
        assert_eq!(g.step_cost(Coord::new(0, 0), middle), u32::MAX / 2 + 11);
        g.node(Coord::new(2, 0)).unwrap().set_cost(u32::MAX);
        assert_eq!(g.step_cost(middle, Coord::new(2, 0)), u32::MAX);

        let path = find_path(&g, Coord::new(0, 0), Coord::new(2, 0), &PathfindingConfig::default()).unwrap();
        assert_eq!(path, vec![Coord::new(0, 0), middle, Coord::new(2, 0)]);
    }

    #[test]
    fn searches_tolerate_concurrent_graph_edits() {
        use std::sync::atomic::{AtomicBool, Ordering};

        use rayon::prelude::*;

        let g = GridGraphBuilder::new(16, 16).eight_connected().build();
        let interior: Vec<Coord> = (1..15).flat_map(|x| (6..10).map(move |y| Coord::new(x, y))).collect();
        let stop = AtomicBool::new(false);
        let config = PathfindingConfig { parallel_neighbor_threshold: 4, ..Default::default() };

        let results = std::thread::scope(|scope| {
            scope.spawn(|| {
                let mut round = 0u32;
                while !stop.load(Ordering::Relaxed) {
                    for (i, &c) in interior.iter().enumerate() {
                        let node = g.node(c).unwrap();
                        node.set_blocked((i as u32).wrapping_add(round) % 3 == 0);
                        node.set_cost(1 + (i as u32 * 7).wrapping_add(round) % 40);
                    }
                    round = round.wrapping_add(1);
                }
                for &c in &interior {
                    g.node(c).unwrap().set_blocked(false);
                }
            });

            let results: Vec<_> = (0..64)
                .into_par_iter()
                .map(|i| {
                    let start = Coord::new(i % 16, 0);
                    let goal = Coord::new(15 - i % 16, 15);
                    (start, goal, find_path(&g, start, goal, &config))
                })
                .collect();
            stop.store(true, Ordering::Relaxed);
            results
        });

        for (start, goal, result) in results {
            match result {
                Ok(path) => {
                    assert_eq!(path.first(), Some(&start));
                    assert_eq!(path.last(), Some(&goal));
                    assert_walkable(&g, &path);
                }
                Err(PathError::Unreachable { .. }) => {}
                Err(e) => panic!("unexpected error {e}"),
            }
        }
    }
}

#[cfg(test)]
mod service {
    use std::sync::Arc;

    use colony_core::{Coord, GraphId, UnitFlags};
    use colony_ecs::{System, World, WorldBuilder};

    use crate::{
        GraphRouting, GridGraphBuilder, PathRequest, PathResult, PathfinderSystem, UnitFlag,
        poll_path_result, request_path,
    };

    fn world() -> World {
        WorldBuilder::new()
            .register_component::<PathRequest>()
            .register_component::<PathResult>()
            .register_flag::<UnitFlag>()
            .build()
    }

    fn open(id: u16) -> Arc<crate::GridGraph> {
        Arc::new(GridGraphBuilder::new(10, 10).id(GraphId(id)).four_connected().build())
    }

    fn walled(id: u16) -> Arc<crate::GridGraph> {
        let mut b = GridGraphBuilder::new(10, 10).id(GraphId(id)).four_connected();
        for y in 0..10 {
            b = b.block(Coord::new(5, y));
        }
        Arc::new(b.build())
    }

    #[test]
    fn same_start_and_destination_resolves_in_one_tick() {
        let w = world();
        let mut sys = PathfinderSystem::new(vec![open(0)]);
        sys.initialize(&w).unwrap();
        let e = w.create_entity();
        request_path(&w, e, Coord::new(3, 3), Coord::new(3, 3)).unwrap();
        assert!(poll_path_result(&w, e).is_none());

        sys.run(&w, 0.1);
        let result = poll_path_result(&w, e).unwrap();
        assert_eq!(result.path, vec![Coord::new(3, 3)]);
        assert!(w.component::<PathRequest>(e).unwrap().processed);
        assert_eq!(sys.last_batch().found, 1);
    }

    #[test]
    fn processed_requests_are_not_recomputed() {
        let w = world();
        let mut sys = PathfinderSystem::new(vec![open(0)]);
        sys.initialize(&w).unwrap();
        let e = w.create_entity();
        request_path(&w, e, Coord::new(0, 0), Coord::new(9, 9)).unwrap();
        sys.run(&w, 0.1);
        assert_eq!(sys.last_batch().resolved, 1);
        sys.run(&w, 0.1);
        assert_eq!(sys.last_batch().resolved, 0);
        assert_eq!(poll_path_result(&w, e).unwrap().path.len(), 19);
    }

    #[test]
    fn flags_pick_the_graph() {
        let w = world();
        let mut sys = PathfinderSystem::new(vec![open(0), walled(1)]);
        sys.initialize(&w).unwrap();

        let cart = w.create_entity();
        let gatherer = w.create_entity();
        let unflagged = w.create_entity();
        w.add_flag(cart, UnitFlag(UnitFlags::CART)).unwrap();
        w.add_flag(gatherer, UnitFlag(UnitFlags::GATHERER)).unwrap();
        for e in [cart, gatherer, unflagged] {
            request_path(&w, e, Coord::new(0, 0), Coord::new(9, 9)).unwrap();
        }
        sys.run(&w, 0.1);

        assert!(poll_path_result(&w, cart).unwrap().found());
        assert!(!poll_path_result(&w, gatherer).unwrap().found());
        assert!(poll_path_result(&w, unflagged).unwrap().found());
        let stats = sys.last_batch();
        assert_eq!((stats.resolved, stats.found, stats.unreachable), (3, 2, 1));
    }

    #[test]
    fn unknown_graph_is_skipped() {
        let w = world();
        let routing = GraphRouting::new(GraphId(7));
        let mut sys = PathfinderSystem::new(vec![open(0)]).with_routing(routing);
        sys.initialize(&w).unwrap();
        let e = w.create_entity();
        request_path(&w, e, Coord::new(0, 0), Coord::new(1, 1)).unwrap();
        sys.run(&w, 0.1);
        assert!(poll_path_result(&w, e).is_none());
        assert_eq!(sys.last_batch().skipped, 1);
    }

    #[test]
    fn new_request_clears_old_result() {
        let w = world();
        let mut sys = PathfinderSystem::new(vec![open(0)]);
        sys.initialize(&w).unwrap();
        let e = w.create_entity();
        request_path(&w, e, Coord::new(0, 0), Coord::new(2, 0)).unwrap();
        sys.run(&w, 0.1);
        assert!(poll_path_result(&w, e).is_some());

        request_path(&w, e, Coord::new(0, 0), Coord::new(0, 4)).unwrap();
        assert!(poll_path_result(&w, e).is_none());
        sys.run(&w, 0.1);
        assert_eq!(poll_path_result(&w, e).unwrap().end(), Some(Coord::new(0, 4)));
    }

    #[test]
    fn many_requests_resolve_in_parallel() {
        let w = world();
        let mut sys = PathfinderSystem::new(vec![open(0)]);
        sys.initialize(&w).unwrap();
        let ids: Vec<_> = (0..64)
            .map(|i| {
                let e = w.create_entity();
                request_path(&w, e, Coord::new(0, 0), Coord::new(i % 10, i / 10 % 10)).unwrap();
                e
            })
            .collect();
        sys.run(&w, 0.1);
        assert_eq!(sys.last_batch().found, 64);
        for e in ids {
            assert!(poll_path_result(&w, e).unwrap().found());
        }
    }

    #[test]
    fn initialize_requires_stores() {
        let w = WorldBuilder::new().build();
        let mut sys = PathfinderSystem::new(vec![open(0)]);
        assert!(sys.initialize(&w).is_err());
    }

    #[test]
    fn default_routing_table() {
        let r = GraphRouting::default();
        assert_eq!(r.graph_for(None), GraphId(0));
        assert_eq!(r.graph_for(Some(UnitFlags::CART)), GraphId(0));
        assert_eq!(r.graph_for(Some(UnitFlags::GATHERER)), GraphId(1));
        assert_eq!(r.graph_for(Some(UnitFlags::BUILDER)), GraphId(2));
        assert_eq!(r.graph_for(Some(UnitFlags::HERBIVORE)), GraphId(0));
    }
}
