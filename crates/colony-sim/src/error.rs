use colony_core::CoreError;
use colony_ecs::EcsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("scheduler configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("could not build worker pool: {0}")]
    ThreadPool(String),

    #[error("no system named {0:?}")]
    UnknownSystem(String),

    #[error("system initialization failed: {0}")]
    Ecs(#[from] EcsError),
}

pub type SimResult<T> = Result<T, SimError>;
