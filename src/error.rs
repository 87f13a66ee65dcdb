//! Error types for Murmur.
//!
//! Ticking a flock never fails. Errors only occur at the edges: building
//! a simulation from an invalid configuration, loading a configuration
//! file, stepping a flock that is not running, or parsing a command.

use crate::simulation::FlockState;
use thiserror::Error;

/// Errors raised while validating or loading a [`FlockConfig`](crate::FlockConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration value is out of its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    /// An agent references a faction with no profile.
    #[error("no profile registered for faction {0}")]
    UnknownFaction(u32),
    /// The configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// The configuration file could not be read.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the [`Flock`](crate::Flock) runtime.
#[derive(Debug, Error)]
pub enum FlockError {
    /// A tick was requested while the flock was idle or stopped.
    #[error("flock is {0:?}, expected Running")]
    NotRunning(FlockState),
    /// `start` was called on a stopped flock.
    #[error("a stopped flock cannot be restarted")]
    Restart,
    /// The simulation could not be built.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised when parsing a scheduled command such as `120:left:2`.
#[derive(Debug, Error, PartialEq)]
pub enum CommandParseError {
    /// The tick prefix is missing or not a number.
    #[error("expected TICK:KIND[:ARGS], got '{0}'")]
    Malformed(String),
    /// The command kind is not one of left, right, accel, quit.
    #[error("unknown command '{0}' (expected left, right, accel or quit)")]
    UnknownKind(String),
    /// A numeric argument could not be parsed.
    #[error("invalid argument '{0}'")]
    BadArgument(String),
}
