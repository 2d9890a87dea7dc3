//! Error types for Resonate.

use thiserror::Error;

/// Result type alias using Resonate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Resonate.
#[derive(Error, Debug)]
pub enum Error {
    // Per-source errors, recovered inside the resolution loop
    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Source returned no playable audio: {0}")]
    Validation(String),

    // Terminal errors
    #[error("Could not resolve a stream for {id} after {rounds} rounds")]
    ResolutionFailed { id: String, rounds: u32 },

    #[error("Resolution cancelled")]
    Cancelled,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Network and HTTP errors raised while talking to a single source.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl Error {
    /// Returns true for errors raised by a single source, which the
    /// resolver absorbs before moving on to the next one.
    pub const fn is_source_error(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Validation(_) | Self::Json(_)
        )
    }

    /// Returns true if this is the terminal "every source failed" error.
    pub const fn is_resolution_failed(&self) -> bool {
        matches!(self, Self::ResolutionFailed { .. })
    }
}
