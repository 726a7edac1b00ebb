//! The `State` trait — what one FSM state does each tick.

use crate::BehaviorActions;

/// Behaviour of a single FSM state, emitting signals of type `F`.
///
/// Each state declares its own parameter type.  The state machine calls the
/// provider registered alongside the state to build a fresh `Params` value
/// right before each call, so the state always sees current data.
///
/// Only [`tick`][Self::tick] is required.  Enter/exit default to empty
/// bundles; any transition check they set is ignored.
///
/// # Example
///
/// ```rust,ignore
/// struct Wait;
///
/// impl State<Signal> for Wait {
///     type Params = (Arc<AtomicU32>, u32);
///
///     fn tick(&self, (elapsed, limit): Self::Params) -> BehaviorActions<Signal> {
///         let mut out = BehaviorActions::new();
///         let seen = elapsed.clone();
///         out.add_parallel(0, move || { seen.fetch_add(1, Ordering::Relaxed); });
///         out.set_transition(move || (elapsed.load(Ordering::Relaxed) >= limit).then_some(Signal::Done));
///         out
///     }
/// }
/// ```
pub trait State<F>: Send + Sync {
    type Params;

    fn tick(&self, params: Self::Params) -> BehaviorActions<F>;

    fn on_enter(&self, _params: Self::Params) -> BehaviorActions<F> {
        BehaviorActions::new()
    }

    fn on_exit(&self, _params: Self::Params) -> BehaviorActions<F> {
        BehaviorActions::new()
    }
}

// ── Type erasure ──────────────────────────────────────────────────────────────

/// A state bound to its parameter provider, with `Params` erased.
pub(crate) trait BoundState<F>: Send + Sync {
    fn tick(&self) -> BehaviorActions<F>;
    fn on_enter(&self) -> BehaviorActions<F>;
    fn on_exit(&self) -> BehaviorActions<F>;
}

pub(crate) struct Bound<T, P> {
    pub(crate) state:  T,
    pub(crate) params: P,
}

impl<F, T, P> BoundState<F> for Bound<T, P>
where
    T: State<F>,
    P: Fn() -> T::Params + Send + Sync,
{
    fn tick(&self) -> BehaviorActions<F> {
        self.state.tick((self.params)())
    }

    fn on_enter(&self) -> BehaviorActions<F> {
        self.state.on_enter((self.params)())
    }

    fn on_exit(&self) -> BehaviorActions<F> {
        self.state.on_exit((self.params)())
    }
}
