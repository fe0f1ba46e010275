//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` via `From`
//! where a core failure (usually a bad configuration) can surface.

use thiserror::Error;

/// The top-level error type for `er-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `er-core`.
pub type CoreResult<T> = Result<T, CoreError>;
