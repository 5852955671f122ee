//! Unified error types for the HelpBeacon indicator.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! binary's top-level error handling uniform.  Nothing inside the state
//! machine returns these: the engine has no failure modes of its own.
//! They surface from configuration loading, the input device, the
//! network transport and thread start-up.

use core::fmt;

use crate::app::ports::{CommsError, InputError};
use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation outside the engine funnels into this type.
#[derive(Debug)]
pub enum Error {
    /// The network transport failed.
    Comms(CommsError),
    /// The input device failed or closed.
    Input(InputError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// A worker thread or adapter could not be started.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Input(e) => write!(f, "input: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

impl From<InputError> for Error {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
