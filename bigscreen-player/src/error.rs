//! Error types for bigscreen-player
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation.

use thiserror::Error;

/// Main error type for bigscreen-player
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network-level failure talking to the media service
    #[error("API transport error: {0}")]
    Transport(String),

    /// The media service answered with an unexpected status code
    #[error("API returned status {0}")]
    ApiStatus(u16),

    /// Player process errors
    #[error("Player error: {0}")]
    Player(String),
}

/// Convenience Result type using bigscreen-player Error
pub type Result<T> = std::result::Result<T, Error>;
