//! Error types for the repl-pipe crate.
//!
//! This module provides a unified error type [`PipeError`] that covers all
//! possible failure modes when spawning and communicating with an
//! interpreter subprocess over merged-output pipes.

use std::io;

/// The error type for pipe operations.
#[derive(Debug, thiserror::Error)]
pub enum PipeError {
    /// Failed to create the output pipe.
    #[error("failed to create pipe: {0}")]
    Create(#[source] io::Error),

    /// Failed to spawn the interpreter process.
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        /// The command that failed to spawn.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The child was spawned without a usable stdin handle.
    #[error("child process has no stdin handle")]
    MissingStdin,

    /// An I/O error occurred during pipe operations.
    #[error("pipe I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failed to wait for the child process.
    #[error("failed to wait for child: {0}")]
    Wait(#[source] io::Error),
}

/// A specialized Result type for pipe operations.
pub type Result<T> = std::result::Result<T, PipeError>;

#[cfg(unix)]
impl From<rustix::io::Errno> for PipeError {
    fn from(errno: rustix::io::Errno) -> Self {
        Self::Io(io::Error::from_raw_os_error(errno.raw_os_error()))
    }
}

impl PipeError {
    /// Create a spawn error for the given command.
    pub fn spawn(command: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
        }
    }
}
