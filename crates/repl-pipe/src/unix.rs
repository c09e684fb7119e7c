//! Unix pipe allocation and interpreter process management.
//!
//! The interpreter child is spawned with stdin piped and with stdout and
//! stderr both connected to the write end of a single pipe, so the parent
//! observes one merged, ordered output stream. The parent-side read end is
//! set non-blocking and wrapped for async I/O.

use std::io;
use std::os::unix::io::{AsRawFd, OwnedFd, RawFd};
use std::pin::Pin;
use std::process::Stdio;
use std::task::{Context, Poll};

use rustix::fs::{OFlags, fcntl_setfl};
use tokio::io::unix::AsyncFd;
use tokio::io::{AsyncRead, AsyncWrite, Interest, ReadBuf};
use tokio::process::{Child, ChildStdin, Command};

use crate::config::SpawnConfig;
use crate::error::{PipeError, Result};

/// The parent side of an interpreter pipe pair.
///
/// Reads return the child's merged stdout/stderr byte stream; writes go to
/// the child's stdin.
pub struct PipeStream {
    /// Read end of the merged output pipe, wrapped for async I/O.
    output: AsyncFd<OwnedFd>,
    /// The child's stdin handle.
    input: ChildStdin,
}

impl std::fmt::Debug for PipeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeStream")
            .field("output_fd", &self.output.as_raw_fd())
            .finish_non_exhaustive()
    }
}

/// Handle for controlling a spawned interpreter process.
///
/// Dropping the handle kills a still-running child, so an aborted build
/// cannot leak interpreters.
#[derive(Debug)]
pub struct PipeChild {
    child: Child,
    pid: Option<u32>,
}

/// Spawn an interpreter subprocess with merged stdout/stderr.
///
/// # Errors
///
/// Returns an error if pipe allocation or process spawning fails, or if the
/// child ends up without a stdin handle.
pub fn spawn(config: &SpawnConfig) -> Result<(PipeStream, PipeChild)> {
    // CLOEXEC so the child does not inherit the parent's read end; the
    // write ends are dup2'ed onto the child's stdout/stderr, which clears
    // the flag on those copies.
    let (read_fd, write_fd) = rustix::pipe::pipe_with(rustix::pipe::PipeFlags::CLOEXEC)
        .map_err(|e| PipeError::Create(io::Error::from_raw_os_error(e.raw_os_error())))?;
    let write_dup = write_fd.try_clone().map_err(PipeError::Create)?;

    let mut command = Command::new(&config.command);
    command
        .args(&config.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::from(write_fd))
        .stderr(Stdio::from(write_dup))
        .kill_on_drop(true);
    if let Some(dir) = &config.working_dir {
        command.current_dir(dir);
    }
    for (key, value) in &config.env {
        command.env(key, value);
    }

    let mut child = command
        .spawn()
        .map_err(|e| PipeError::spawn(&config.command, e))?;
    // `command` drops here, closing the parent's copies of the write end so
    // EOF propagates once the child exits.
    drop(command);

    let input = child.stdin.take().ok_or(PipeError::MissingStdin)?;

    fcntl_setfl(&read_fd, OFlags::NONBLOCK)
        .map_err(|e| PipeError::Create(io::Error::from_raw_os_error(e.raw_os_error())))?;
    let output = AsyncFd::with_interest(read_fd, Interest::READABLE).map_err(PipeError::Create)?;

    let pid = child.id();
    tracing::debug!(command = %config.command, ?pid, "spawned interpreter");

    Ok((PipeStream { output, input }, PipeChild { child, pid }))
}

impl PipeChild {
    /// Get the process ID of the child, if it is still running.
    #[must_use]
    pub const fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Kill the child process.
    ///
    /// Killing an already-exited child is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the kill signal could not be delivered for any
    /// reason other than the child having already exited.
    pub async fn kill(&mut self) -> Result<()> {
        match self.child.kill().await {
            Ok(()) => Ok(()),
            // Already exited (and reaped): teardown is idempotent.
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(PipeError::Io(e)),
        }
    }

    /// Check whether the child has exited without blocking.
    ///
    /// # Errors
    ///
    /// Returns an error if the status could not be collected.
    pub fn try_wait(&mut self) -> Result<Option<std::process::ExitStatus>> {
        self.child.try_wait().map_err(PipeError::Wait)
    }

    /// Wait for the child to exit.
    ///
    /// # Errors
    ///
    /// Returns an error if waiting fails.
    pub async fn wait(&mut self) -> Result<std::process::ExitStatus> {
        self.child.wait().await.map_err(PipeError::Wait)
    }
}

impl AsRawFd for PipeStream {
    fn as_raw_fd(&self) -> RawFd {
        self.output.as_raw_fd()
    }
}

impl AsyncRead for PipeStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        loop {
            let mut guard = match this.output.poll_read_ready(cx) {
                Poll::Ready(Ok(guard)) => guard,
                Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                Poll::Pending => return Poll::Pending,
            };

            let unfilled = buf.initialize_unfilled();
            match rustix::io::read(this.output.get_ref(), unfilled) {
                Ok(0) => {
                    // EOF: the child exited and all write ends are closed.
                    return Poll::Ready(Ok(()));
                }
                Ok(n) => {
                    buf.advance(n);
                    return Poll::Ready(Ok(()));
                }
                Err(rustix::io::Errno::AGAIN) => {
                    guard.clear_ready();
                }
                Err(e) => {
                    return Poll::Ready(Err(io::Error::from_raw_os_error(e.raw_os_error())));
                }
            }
        }
    }
}

impl AsyncWrite for PipeStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().input).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().input).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().input).poll_shutdown(cx)
    }
}
