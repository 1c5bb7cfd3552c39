//! Common error types for bibfetch

use thiserror::Error;

/// Common result type for bibfetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the bibfetch crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
