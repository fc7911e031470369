use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the MoveMyCam engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The global keyboard hook could not be installed.
    #[error("Keyboard hook error: {0}")]
    Hook(String),

    /// The configuration store rejected an operation.
    #[error("Configuration error: {0}")]
    Config(#[from] config::Error),

    /// I/O failure while spawning engine threads.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
