//! Patrol agents: an `Idle → Walk → Wait` state machine per agent, driven
//! by one system.
//!
//! States never touch the world.  Each agent has a [`Board`] that
//! `pre_execute` fills from the world (the latest path answer) and that
//! `post_execute` drains back into it (new path requests, position).  The
//! state machines in between only read and write their boards.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use colony_core::{Coord, EntityId, SimRng, UnitFlags};
use colony_ecs::{Access, EcsResult, System, World};
use colony_fsm::{BehaviorActions, Fsm, State, tick_batch};
use colony_path::{GridGraph, PathRequest, PathResult, UnitFlag, poll_path_result, request_path};
use parking_lot::Mutex;

/// Where a patrol agent currently stands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Position(pub Coord);

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Mode {
    Idle,
    Walk,
    Wait,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Signal {
    Go,
    Arrived,
    Blocked,
}

/// One agent's view of the world plus its outgoing requests.
#[derive(Debug)]
struct Board {
    position:   Coord,
    waypoints:  Vec<Coord>,
    next:       usize,
    /// Set while a request is outstanding.
    awaiting:   bool,
    path:       Option<PathResult>,
    step:       usize,
    waited:     u32,
    wait_ticks: u32,
    request:    Option<(Coord, Coord)>,
}

impl Board {
    fn goal(&self) -> Coord {
        self.waypoints[self.next]
    }

    fn skip_waypoint(&mut self) {
        self.next = (self.next + 1) % self.waypoints.len();
    }
}

type Shared = Arc<Mutex<Board>>;

// ── States ────────────────────────────────────────────────────────────────────

struct Idle;

impl State<Signal> for Idle {
    type Params = ();

    fn tick(&self, _: ()) -> BehaviorActions<Signal> {
        let mut out = BehaviorActions::new();
        out.set_transition(|| Some(Signal::Go));
        out
    }
}

/// Ask for a path on entry, then take one step per tick once it arrives.
struct Walk;

impl State<Signal> for Walk {
    type Params = Shared;

    fn tick(&self, board: Shared) -> BehaviorActions<Signal> {
        let mut out = BehaviorActions::new();
        let mover = board.clone();
        out.add_parallel(0, move || {
            let mut guard = mover.lock();
            let b = &mut *guard;
            let Some(path) = &b.path else { return };
            if b.step + 1 < path.path.len() {
                b.step += 1;
                b.position = path.path[b.step];
            }
        });
        out.set_transition(move || {
            let b = board.lock();
            let path = b.path.as_ref()?;
            if !path.found() {
                Some(Signal::Blocked)
            } else if path.end() == Some(b.position) {
                Some(Signal::Arrived)
            } else {
                None
            }
        });
        out
    }

    fn on_enter(&self, board: Shared) -> BehaviorActions<Signal> {
        let mut out = BehaviorActions::new();
        out.add_main(0, move || {
            let mut b = board.lock();
            let (from, to) = (b.position, b.goal());
            b.path = None;
            b.step = 0;
            b.request = Some((from, to));
        });
        out
    }
}

/// Linger at the waypoint, then head for the next one.
struct Wait;

impl State<Signal> for Wait {
    type Params = Shared;

    fn tick(&self, board: Shared) -> BehaviorActions<Signal> {
        let mut out = BehaviorActions::new();
        let counter = board.clone();
        out.add_parallel(0, move || counter.lock().waited += 1);
        out.set_transition(move || {
            let b = board.lock();
            (b.waited >= b.wait_ticks).then_some(Signal::Go)
        });
        out
    }

    fn on_enter(&self, board: Shared) -> BehaviorActions<Signal> {
        let mut out = BehaviorActions::new();
        out.add_main(0, move || {
            let mut b = board.lock();
            b.waited = 0;
            b.skip_waypoint();
        });
        out
    }
}

// ── System ────────────────────────────────────────────────────────────────────

/// Counters shared with the progress observer.
#[derive(Debug, Default)]
pub struct PatrolStats {
    pub arrivals: AtomicU64,
    pub blocked:  AtomicU64,
}

pub struct PatrolSystem {
    entities: Vec<EntityId>,
    boards:   Vec<Shared>,
    fsms:     Vec<Fsm<Mode, Signal>>,
    stats:    Arc<PatrolStats>,
}

impl PatrolSystem {
    /// Spawn `agents` patrollers.  Even-numbered agents are carts on graph 0,
    /// odd-numbered ones gatherers on graph 1; each gets `waypoints` open
    /// cells of its own graph to cycle through.
    pub fn spawn(
        world: &World,
        graphs: &[Arc<GridGraph>],
        agents: usize,
        waypoints: usize,
        wait_ticks: u32,
        rng: &mut SimRng,
    ) -> EcsResult<Self> {
        let stats = Arc::new(PatrolStats::default());
        let mut this = Self { entities: Vec::new(), boards: Vec::new(), fsms: Vec::new(), stats };
        let (Some(carts), Some(gatherers)) = (graphs.first(), graphs.get(1).or(graphs.first())) else {
            tracing::warn!("no graphs; spawning no patrols");
            return Ok(this);
        };

        for i in 0..agents {
            let (flag, graph) =
                if i % 2 == 0 { (UnitFlags::CART, carts) } else { (UnitFlags::GATHERER, gatherers) };
            let route: Vec<Coord> = (0..waypoints.max(1) + 1).map(|_| open_cell(graph, rng)).collect();

            let entity = world.create_entity();
            world.add_flag(entity, UnitFlag(flag))?;
            world.add_component(entity, Position(route[0]))?;

            let board = Arc::new(Mutex::new(Board {
                position: route[0],
                waypoints: route[1..].to_vec(),
                next: 0,
                awaiting: false,
                path: None,
                step: 0,
                waited: 0,
                wait_ticks,
                request: None,
            }));
            this.fsms.push(patrol_fsm(&board, &this.stats));
            this.entities.push(entity);
            this.boards.push(board);
        }
        tracing::info!(agents, waypoints, "patrols spawned");
        Ok(this)
    }

    pub fn stats(&self) -> Arc<PatrolStats> {
        self.stats.clone()
    }
}

fn patrol_fsm(board: &Shared, stats: &Arc<PatrolStats>) -> Fsm<Mode, Signal> {
    let mut fsm = Fsm::new();
    let (walk, wait) = (board.clone(), board.clone());
    fsm.add_state(Mode::Idle, Idle, || ())
        .add_state(Mode::Walk, Walk, move || walk.clone())
        .add_state(Mode::Wait, Wait, move || wait.clone());

    let arrivals = stats.clone();
    let blocked = stats.clone();
    let skipper = board.clone();
    fsm.set_transition(Mode::Idle, Signal::Go, Mode::Walk, None)
        .set_transition(
            Mode::Walk,
            Signal::Arrived,
            Mode::Wait,
            Some(Box::new(move || {
                arrivals.arrivals.fetch_add(1, Ordering::Relaxed);
            })),
        )
        .set_transition(
            Mode::Walk,
            Signal::Blocked,
            Mode::Idle,
            Some(Box::new(move || {
                blocked.blocked.fetch_add(1, Ordering::Relaxed);
                skipper.lock().skip_waypoint();
            })),
        )
        .set_transition(Mode::Wait, Signal::Go, Mode::Walk, None);
    fsm.subscribe(|change| tracing::trace!(?change, "patrol state change"));
    fsm.force_transition(Mode::Idle);
    fsm
}

/// A random cell that is passable on `graph`.  Falls back to any cell after
/// a bounded number of tries; the search then substitutes a neighbour.
fn open_cell(graph: &GridGraph, rng: &mut SimRng) -> Coord {
    let (w, h) = (graph.width() as i32, graph.height() as i32);
    let mut pick = || Coord::new(rng.gen_range(0..w), rng.gen_range(0..h));
    for _ in 0..64 {
        let c = pick();
        if !graph.is_blocked(c) {
            return c;
        }
    }
    pick()
}

impl System for PatrolSystem {
    fn name(&self) -> &str {
        "patrol"
    }

    fn access(&self) -> Access {
        Access::new()
            .reads::<PathResult>()
            .writes::<PathRequest>()
            .writes::<PathResult>()
            .writes::<Position>()
    }

    fn initialize(&mut self, world: &World) -> EcsResult<()> {
        world.component_store::<Position>()?;
        world.component_store::<PathRequest>()?;
        Ok(())
    }

    fn pre_execute(&mut self, world: &World, _dt: f32) {
        for (&entity, board) in self.entities.iter().zip(&self.boards) {
            let mut b = board.lock();
            if b.awaiting {
                if let Some(result) = poll_path_result(world, entity) {
                    b.awaiting = false;
                    b.path = Some(result);
                }
            }
        }
    }

    fn execute(&mut self, _world: &World, _dt: f32) {
        for (i, result) in tick_batch(&mut self.fsms).into_iter().enumerate() {
            if let Err(e) = result {
                tracing::warn!(entity = %self.entities[i], error = %e, "patrol fsm failed");
            }
        }
    }

    fn post_execute(&mut self, world: &World, _dt: f32) {
        for (&entity, board) in self.entities.iter().zip(&self.boards) {
            let mut b = board.lock();
            if let Some((from, to)) = b.request.take() {
                match request_path(world, entity, from, to) {
                    Ok(()) => b.awaiting = true,
                    Err(e) => tracing::warn!(%entity, error = %e, "path request failed"),
                }
            }
            if let Err(e) = world.with_component_mut::<Position, _>(entity, |p| p.0 = b.position) {
                tracing::warn!(%entity, error = %e, "patrol position not stored");
            }
        }
    }
}
