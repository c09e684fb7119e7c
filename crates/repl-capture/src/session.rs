//! Session handle and the line submission loop.
//!
//! A [`Session`] owns a transport and a [`PromptFramer`] and drives the
//! serial request/response protocol: write one input line, then read until
//! the interpreter prints a prompt marker, attributing every intervening
//! output line to that input. [`ReplSession`] pairs a session with the
//! child-control handle of a real interpreter subprocess.

use repl_pipe::{PipeChild, PipeStream};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::bootstrap::InitScript;
use crate::config::{CaptureConfig, Marker};
use crate::directive::{Directive, split_directive};
use crate::error::{CaptureError, Result};
use crate::framing::PromptFramer;
use crate::transcript::TranscriptLine;

/// The session's persistent display defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayState {
    /// Whether input lines are echoed into the transcript.
    pub show_input: bool,
    /// Whether ordinary output lines are recorded into the transcript.
    pub show_output: bool,
}

/// Per-invocation display overrides.
///
/// Unset axes fall back to the session's persistent defaults. Overrides do
/// not mutate the persistent defaults; only standalone toggle directives do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOverride {
    /// Override for input echo.
    pub show_input: Option<bool>,
    /// Override for output recording.
    pub show_output: Option<bool>,
}

impl DisplayOverride {
    /// No overrides; use the session defaults for both axes.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            show_input: None,
            show_output: None,
        }
    }

    /// Set the input-echo override.
    #[must_use]
    pub const fn input(mut self, show: bool) -> Self {
        self.show_input = Some(show);
        self
    }

    /// Set the output-recording override.
    #[must_use]
    pub const fn output(mut self, show: bool) -> Self {
        self.show_output = Some(show);
        self
    }
}

/// A capture session over an arbitrary transport.
///
/// Generic over the transport so protocol behavior is testable against an
/// in-memory interpreter; production code uses [`ReplSession`].
#[derive(Debug)]
pub struct Session<T> {
    transport: T,
    framer: PromptFramer,
    reserved_token: String,
    display: DisplayState,
    last_marker: Marker,
}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Session<T> {
    /// Create a session over an already-idle transport (no handshake).
    #[must_use]
    pub fn new(transport: T, config: &CaptureConfig) -> Self {
        Self {
            transport,
            framer: PromptFramer::new(config.markers.clone(), config.read_timeout),
            reserved_token: config.reserved_token.clone(),
            display: DisplayState {
                show_input: config.show_input,
                show_output: config.show_output,
            },
            last_marker: Marker::Primary,
        }
    }

    /// Create a session over a freshly spawned transport, discarding the
    /// interpreter's startup prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the handshake read fails.
    pub async fn attach(transport: T, config: &CaptureConfig) -> Result<Self> {
        let mut session = Self::new(transport, config);
        session
            .framer
            .discard_startup_prompt(&mut session.transport)
            .await?;
        Ok(session)
    }

    /// The session's persistent display defaults.
    #[must_use]
    pub const fn display(&self) -> DisplayState {
        self.display
    }

    /// The reserved directive/signal token.
    #[must_use]
    pub fn reserved_token(&self) -> &str {
        &self.reserved_token
    }

    /// Whether the interpreter is idle at the primary prompt.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.last_marker, Marker::Primary)
    }

    /// Submit input lines and capture the resulting transcript, using the
    /// session's persistent display defaults.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed directives or protocol failure.
    pub async fn communicate<I, S>(&mut self, lines: I) -> Result<Vec<TranscriptLine>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.communicate_with(lines, DisplayOverride::none()).await
    }

    /// Submit input lines with per-invocation display overrides.
    ///
    /// Each line is written to the interpreter followed by a newline; the
    /// echoed `<marker><line>` entry is recorded when input is shown, and
    /// every output line observed before the next prompt marker is recorded
    /// subject to the output setting (signal lines are always recorded).
    /// After the last line, blank lines are submitted until the primary
    /// marker is observed, so the session always ends idle.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed directives or protocol failure.
    pub async fn communicate_with<I, S>(
        &mut self,
        lines: I,
        overrides: DisplayOverride,
    ) -> Result<Vec<TranscriptLine>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let token = self.reserved_token.clone();
        let mut effective = DisplayState {
            show_input: overrides.show_input.unwrap_or(self.display.show_input),
            show_output: overrides.show_output.unwrap_or(self.display.show_output),
        };
        let mut out = Vec::new();

        for line in lines {
            let line = line.as_ref();
            let (payload, directive) = match split_directive(line, &token) {
                Some((before, text)) => (before, Some(Directive::parse(text)?)),
                None => (line, None),
            };

            if let Some(directive) = directive
                && payload.trim().is_empty()
            {
                // Standalone toggle: mutate the persistent defaults and
                // submit nothing to the interpreter.
                if let Some(show) = directive.input() {
                    self.display.show_input = show;
                    effective.show_input = show;
                }
                if let Some(show) = directive.output() {
                    self.display.show_output = show;
                    effective.show_output = show;
                }
                continue;
            }

            let show_input = directive
                .and_then(|d| d.input())
                .unwrap_or(effective.show_input);
            let show_output = directive
                .and_then(|d| d.output())
                .unwrap_or(effective.show_output);
            self.submit(payload, show_input, show_output, &token, &mut out)
                .await?;
        }

        // Drain an unfinished statement back to the primary prompt so the
        // next invocation starts from a clean slate.
        while self.last_marker == Marker::Continuation {
            self.submit("", effective.show_input, effective.show_output, &token, &mut out)
                .await?;
        }

        Ok(out)
    }

    /// Write one line and drive the framer to the next marker.
    async fn submit(
        &mut self,
        line: &str,
        show_input: bool,
        show_output: bool,
        token: &str,
        out: &mut Vec<TranscriptLine>,
    ) -> Result<()> {
        self.write_line(line).await?;
        if show_input {
            let marker = self.framer.markers().as_str(self.last_marker);
            out.push(TranscriptLine::Text(format!("{marker}{line}")));
        }
        let marker = self
            .framer
            .read_until_marker(&mut self.transport, |raw| {
                let entry = TranscriptLine::from_output(raw, token);
                if show_output || entry.is_signal() {
                    out.push(entry);
                }
            })
            .await?;
        self.last_marker = marker;
        Ok(())
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        let data = format!("{line}\n");
        self.transport
            .write_all(data.as_bytes())
            .await
            .map_err(|e| CaptureError::io_context("writing to interpreter", e))?;
        self.transport
            .flush()
            .await
            .map_err(|e| CaptureError::io_context("flushing interpreter input", e))?;
        Ok(())
    }
}

/// A capture session bound to a real interpreter subprocess.
#[derive(Debug)]
pub struct ReplSession {
    session: Session<PipeStream>,
    child: PipeChild,
}

impl ReplSession {
    /// Spawn the configured interpreter and perform the startup handshake.
    ///
    /// # Errors
    ///
    /// Returns an error if spawning or the handshake fails. A child whose
    /// handshake fails is killed when its handle drops.
    pub async fn spawn(config: &CaptureConfig) -> Result<Self> {
        let (stream, child) = repl_pipe::spawn(&config.spawn)?;
        let session = Session::attach(stream, config).await?;
        Ok(Self { session, child })
    }

    /// Submit input lines using the session's persistent display defaults.
    ///
    /// # Errors
    ///
    /// See [`Session::communicate`].
    pub async fn communicate<I, S>(&mut self, lines: I) -> Result<Vec<TranscriptLine>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.session.communicate(lines).await
    }

    /// Submit input lines with per-invocation display overrides.
    ///
    /// # Errors
    ///
    /// See [`Session::communicate_with`].
    pub async fn communicate_with<I, S>(
        &mut self,
        lines: I,
        overrides: DisplayOverride,
    ) -> Result<Vec<TranscriptLine>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.session.communicate_with(lines, overrides).await
    }

    /// Run a bootstrap script, requiring it to be silent.
    ///
    /// The script runs with input hidden and output captured; any captured
    /// line means the setup failed.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Bootstrap`] carrying the unexpected output.
    pub async fn bootstrap(&mut self, script: &InitScript) -> Result<()> {
        if script.is_empty() {
            return Ok(());
        }
        let overrides = DisplayOverride::none().input(false).output(true);
        let transcript = self
            .session
            .communicate_with(script.lines(), overrides)
            .await?;
        if transcript.is_empty() {
            Ok(())
        } else {
            let token = self.session.reserved_token().to_string();
            Err(CaptureError::Bootstrap {
                lines: transcript.iter().map(|line| line.render(&token)).collect(),
            })
        }
    }

    /// The interpreter's process ID, if it is still running.
    #[must_use]
    pub const fn pid(&self) -> Option<u32> {
        self.child.pid()
    }

    /// The session's persistent display defaults.
    #[must_use]
    pub const fn display(&self) -> DisplayState {
        self.session.display()
    }

    /// Whether the interpreter is idle at the primary prompt.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.session.is_idle()
    }

    /// Terminate the interpreter. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error only if the kill signal could not be delivered.
    pub async fn kill(&mut self) -> Result<()> {
        self.child.kill().await?;
        Ok(())
    }
}
