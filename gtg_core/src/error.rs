//! Error types for the gtg_core library.

use crate::SessionPhase;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gtg_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller passed an out-of-range value (rating, reps, rest duration)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A transition was requested from a phase that does not allow it
    #[error("Cannot {action} while {phase}")]
    InvalidTransition {
        phase: SessionPhase,
        action: &'static str,
    },

    /// State store failure
    #[error("State error: {0}")]
    State(String),

    /// Deferred job scheduling failure
    #[error("Scheduler error: {0}")]
    Scheduler(String),
}
