//! repl-capture: transcript capture for interactive interpreters
//!
//! This crate drives a long-lived interactive interpreter subprocess one
//! input line at a time and captures, for each line, exactly the output it
//! produced, so documentation builders can embed faithful session
//! transcripts (optionally alongside generated plot artifacts).
//!
//! The only structural anchor in the interpreter's output is its
//! fixed-width prompt pair (e.g. `">>> "` / `"... "`); the
//! [`framing::PromptFramer`] turns that anchor into a reliable framing
//! protocol, and everything else builds on it:
//!
//! - [`session::Session`]: the serial submission loop with inline display
//!   directives and the end-of-invocation continuation drain
//! - [`transcript`]: typed transcript lines and same-kind run segmentation
//! - [`registry::SessionRegistry`]: one live session per document
//! - [`sync`]: blocking facade for synchronous builders
//!
//! # Example
//!
//! ```ignore
//! use repl_capture::{CaptureConfig, DisplayOverride, SyncRegistry, segment};
//!
//! fn main() -> Result<(), repl_capture::CaptureError> {
//!     let registry = SyncRegistry::new(CaptureConfig::default())?;
//!     let transcript = registry.communicate(
//!         "guide/intro.rst",
//!         ["x = 6 * 7", "x"],
//!         DisplayOverride::none(),
//!     )?;
//!     for run in segment(&transcript) {
//!         if let Some(block) = run.render_text() {
//!             println!("{block}");
//!         }
//!     }
//!     registry.kill_all();
//!     Ok(())
//! }
//! ```

pub mod bootstrap;
pub mod config;
pub mod directive;
pub mod error;
pub mod framing;
pub mod registry;
pub mod session;
pub mod signal;
pub mod sync;
pub mod transcript;

/// Scripted in-memory interpreter for protocol tests.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use bootstrap::{ImageFormat, InitScript, RcValue};
pub use config::{
    CaptureConfig, CaptureSettings, DEFAULT_CONTINUATION_MARKER, DEFAULT_PRIMARY_MARKER,
    DEFAULT_READ_TIMEOUT, DEFAULT_RESERVED_TOKEN, Marker, PromptMarkers,
};
pub use directive::{Axis, Directive};
pub use error::{CaptureError, Result};
pub use framing::PromptFramer;
pub use registry::{SessionHandle, SessionRegistry};
pub use session::{DisplayOverride, DisplayState, ReplSession, Session};
pub use signal::Signal;
pub use sync::{SyncRegistry, SyncSession};
pub use transcript::{Run, TranscriptLine, segment};
