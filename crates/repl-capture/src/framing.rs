//! Fixed-width prompt framing over an unstructured byte stream.
//!
//! The interpreter's output is a raw byte stream with exactly one structural
//! anchor: when idle, the interpreter prints one of two fixed-width prompt
//! markers and nothing after it. The [`PromptFramer`] partitions the stream
//! into completed output lines and marker observations by probing exactly
//! marker-width bytes at a time.
//!
//! The probe window may itself span a newline (output that ends exactly at a
//! marker-width boundary, with the next prompt concatenated in the same
//! read). Such a window is split recursively: the bytes before the newline
//! are a completed line, and the window is topped back up to full width.
//! Getting this wrong loses lines or corrupts markers.

use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::config::{Marker, PromptMarkers};
use crate::error::{CaptureError, Result};

/// Read chunk size for topping up the pending buffer.
const READ_CHUNK: usize = 256;

/// Outcome of a single probe.
enum Probe {
    /// The window matched a marker; the interpreter is idle.
    Marker(Marker),
    /// The window is the start of an output line still being produced.
    Partial,
}

/// A stateless-over-the-stream framing reader.
///
/// The framer owns only its pending byte buffer; it borrows the transport
/// for each call, so one framer can outlive reconnections and the session
/// type stays a plain composition of transport + framer.
#[derive(Debug)]
pub struct PromptFramer {
    markers: PromptMarkers,
    read_timeout: Option<Duration>,
    pending: BytesMut,
}

impl PromptFramer {
    /// Create a framer for the given marker pair.
    #[must_use]
    pub fn new(markers: PromptMarkers, read_timeout: Option<Duration>) -> Self {
        Self {
            markers,
            read_timeout,
            pending: BytesMut::new(),
        }
    }

    /// The marker pair this framer probes for.
    #[must_use]
    pub const fn markers(&self) -> &PromptMarkers {
        &self.markers
    }

    /// Bytes read from the stream but not yet resolved into lines or
    /// markers.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Read and discard exactly one marker-width probe.
    ///
    /// This is the spawn handshake: it consumes the interpreter's startup
    /// prompt so the first submission starts from a known idle state.
    ///
    /// # Errors
    ///
    /// Returns an error on EOF, read failure, or timeout.
    pub async fn discard_startup_prompt<R>(&mut self, reader: &mut R) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let width = self.markers.width();
        self.fill(reader, width).await?;
        let _ = self.pending.split_to(width);
        Ok(())
    }

    /// Drive the stream until a prompt marker is observed, invoking
    /// `on_line` for every completed output line seen on the way.
    ///
    /// When this returns, the interpreter is idle at the returned marker and
    /// no further output will arrive for the current input line.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Eof`] if the stream closes mid-protocol and
    /// [`CaptureError::Desynchronized`] if a read timeout elapses before the
    /// stream resolves to a marker.
    pub async fn read_until_marker<R, F>(&mut self, reader: &mut R, mut on_line: F) -> Result<Marker>
    where
        R: AsyncRead + Unpin,
        F: FnMut(String),
    {
        loop {
            match self.probe(reader, &mut on_line).await? {
                Probe::Marker(marker) => return Ok(marker),
                Probe::Partial => {
                    // Mid-line: take the rest of the line, then re-probe.
                    let line = self.read_line(reader).await?;
                    on_line(line);
                }
            }
        }
    }

    /// Probe exactly marker-width bytes, splitting off completed lines
    /// until the window contains no newline, then classify it.
    async fn probe<R, F>(&mut self, reader: &mut R, on_line: &mut F) -> Result<Probe>
    where
        R: AsyncRead + Unpin,
        F: FnMut(String),
    {
        let width = self.markers.width();
        self.fill(reader, width).await?;
        while let Some(pos) = find_newline(&self.pending[..width]) {
            let line = self.take_line(pos);
            on_line(line);
            self.fill(reader, width).await?;
        }
        if let Some(marker) = self.markers.classify(&self.pending[..width]) {
            let _ = self.pending.split_to(width);
            return Ok(Probe::Marker(marker));
        }
        Ok(Probe::Partial)
    }

    /// Consume pending bytes up to and including the next newline and
    /// return the completed line.
    async fn read_line<R>(&mut self, reader: &mut R) -> Result<String>
    where
        R: AsyncRead + Unpin,
    {
        let mut searched = 0;
        loop {
            if let Some(pos) = find_newline(&self.pending[searched..]) {
                return Ok(self.take_line(searched + pos));
            }
            searched = self.pending.len();
            self.fill(reader, searched + 1).await?;
        }
    }

    /// Split off the line ending at `newline_pos`, stripping the newline
    /// (and a preceding carriage return, if any).
    fn take_line(&mut self, newline_pos: usize) -> String {
        let mut line = self.pending.split_to(newline_pos + 1);
        line.truncate(newline_pos);
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }
        String::from_utf8_lossy(&line).into_owned()
    }

    /// Ensure at least `want` bytes are pending, reading from the stream as
    /// needed. Every read is bounded by the configured timeout.
    async fn fill<R>(&mut self, reader: &mut R, want: usize) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        while self.pending.len() < want {
            let mut chunk = [0u8; READ_CHUNK];
            let read = reader.read(&mut chunk);
            let result = match self.read_timeout {
                Some(timeout) => tokio::time::timeout(timeout, read)
                    .await
                    .map_err(|_| CaptureError::desynchronized(timeout, &self.pending))?,
                None => read.await,
            };
            let n =
                result.map_err(|e| CaptureError::io_context("reading from interpreter", e))?;
            if n == 0 {
                return Err(CaptureError::eof(&self.pending));
            }
            self.pending.extend_from_slice(&chunk[..n]);
        }
        Ok(())
    }
}

fn find_newline(bytes: &[u8]) -> Option<usize> {
    bytes.iter().position(|&b| b == b'\n')
}
