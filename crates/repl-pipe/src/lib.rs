//! repl-pipe: Merged-output subprocess pipes for interactive interpreters
//!
//! This crate spawns an interpreter subprocess (e.g. `python3 -i -q`) with
//! stdin piped and with stdout and stderr merged into a single pipe, and
//! exposes the result as an async read/write stream plus a child-control
//! handle. It is the transport layer underneath `repl-capture`; it knows
//! nothing about prompts or transcripts.
//!
//! # Quick Start
//!
//! ```ignore
//! use repl_pipe::{SpawnConfig, spawn};
//! use tokio::io::{AsyncReadExt, AsyncWriteExt};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), repl_pipe::PipeError> {
//!     let config = SpawnConfig::new("cat");
//!     let (mut stream, mut child) = spawn(&config)?;
//!
//!     stream.write_all(b"hello\n").await?;
//!     let mut buf = [0u8; 16];
//!     let n = stream.read(&mut buf).await?;
//!     assert_eq!(&buf[..n], b"hello\n");
//!
//!     child.kill().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Design
//!
//! - **Merged output**: stdout and stderr share one pipe write end, so the
//!   parent observes interpreter output (including prompts, which many
//!   interpreters print to stderr) as a single ordered byte stream.
//! - **Composition**: the stream and the child handle are separate values;
//!   protocol logic lives in the caller, not in a process subclass.

pub mod config;
pub mod error;

#[cfg(unix)]
pub mod unix;

pub use config::{DEFAULT_ARGS, DEFAULT_COMMAND, SpawnConfig};
pub use error::{PipeError, Result};

#[cfg(unix)]
pub use unix::{PipeChild, PipeStream, spawn};
