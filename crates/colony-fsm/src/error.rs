use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsmError {
    /// `tick` before any `force_transition`.
    #[error("state machine has no current state; force an initial state first")]
    NotStarted,

    #[error("no behaviour registered for state {state}")]
    NoBehaviour { state: String },
}

pub type FsmResult<T> = Result<T, FsmError>;
