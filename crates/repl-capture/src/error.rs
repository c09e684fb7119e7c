//! Error types for repl-capture.
//!
//! Errors carry the data needed to diagnose a broken capture: the pending
//! byte fragment when framing fails, the offending directive text, or the
//! unexpected bootstrap output.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// The main error type for capture operations.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Failed to spawn or talk to the interpreter subprocess.
    #[error("interpreter transport error: {0}")]
    Pipe(#[from] repl_pipe::PipeError),

    /// An I/O error occurred with additional context.
    #[error("{context}: {source}")]
    IoWithContext {
        /// What operation was being performed.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The interpreter produced output that never resolved to a prompt
    /// marker within the read timeout.
    ///
    /// This is a protocol violation (for example, the interpreter prints a
    /// prompt of a different width than configured); there is no recovery.
    #[error(
        "interpreter desynchronized: no prompt marker within {timeout:?} (pending fragment: {fragment:?})"
    )]
    Desynchronized {
        /// The read timeout that elapsed.
        timeout: Duration,
        /// The unresolved bytes pending at the time of the timeout.
        fragment: String,
    },

    /// The interpreter closed its output stream mid-protocol.
    #[error("interpreter closed its output mid-protocol (pending fragment: {fragment:?})")]
    Eof {
        /// The unresolved bytes pending when the stream closed.
        fragment: String,
    },

    /// An inline display directive did not parse.
    #[error("unknown display directive: {directive:?}")]
    MalformedDirective {
        /// The directive text as written.
        directive: String,
    },

    /// The bootstrap script produced output where silence was expected.
    #[error("interpreter bootstrap was not silent:\n{}", lines.join("\n"))]
    Bootstrap {
        /// The transcript lines the bootstrap produced.
        lines: Vec<String>,
    },

    /// Configuration error (e.g. prompt markers of unequal width).
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Result type alias for capture operations.
pub type Result<T> = std::result::Result<T, CaptureError>;

impl CaptureError {
    /// Create an I/O error with context.
    pub fn io_context(context: impl Into<String>, source: io::Error) -> Self {
        Self::IoWithContext {
            context: context.into(),
            source,
        }
    }

    /// Create a desynchronization error from the pending fragment.
    pub fn desynchronized(timeout: Duration, fragment: &[u8]) -> Self {
        Self::Desynchronized {
            timeout,
            fragment: String::from_utf8_lossy(fragment).into_owned(),
        }
    }

    /// Create an EOF error from the pending fragment.
    pub fn eof(fragment: &[u8]) -> Self {
        Self::Eof {
            fragment: String::from_utf8_lossy(fragment).into_owned(),
        }
    }

    /// Create a malformed-directive error.
    pub fn malformed_directive(directive: impl Into<String>) -> Self {
        Self::MalformedDirective {
            directive: directive.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this is a desynchronization error.
    #[must_use]
    pub const fn is_desynchronized(&self) -> bool {
        matches!(self, Self::Desynchronized { .. })
    }

    /// Get the pending fragment if this error carries one.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        match self {
            Self::Desynchronized { fragment, .. } | Self::Eof { fragment } => Some(fragment),
            _ => None,
        }
    }
}
