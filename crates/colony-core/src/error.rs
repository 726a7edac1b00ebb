//! Base error type.
//!
//! Sub-crates define their own error enums (`EcsError`, `PathError`, …) and
//! wrap this one where a core condition can surface through them.

use thiserror::Error;

/// The top-level error type for `colony-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `colony-core`.
pub type CoreResult<T> = Result<T, CoreError>;
