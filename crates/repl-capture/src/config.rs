//! Configuration types for transcript capture.
//!
//! The prompt markers and the reserved token are parameters, not constants:
//! the probe width is derived from the markers, so any interpreter with a
//! fixed-width prompt pair can be driven by configuring them.

use std::time::Duration;

use serde::Deserialize;

use crate::bootstrap::InitScript;
use crate::error::{CaptureError, Result};

/// Default primary prompt marker.
pub const DEFAULT_PRIMARY_MARKER: &str = ">>> ";

/// Default continuation prompt marker.
pub const DEFAULT_CONTINUATION_MARKER: &str = "... ";

/// Default reserved token introducing inline directives (input side) and
/// out-of-band signal lines (output side).
pub const DEFAULT_RESERVED_TOKEN: &str = "#repl:";

/// Default bound on every subprocess read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Which prompt marker the interpreter printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// The statement is complete; the interpreter is idle.
    Primary,
    /// The interpreter is waiting for more lines of the current statement.
    Continuation,
}

/// The fixed-width prompt marker pair of an interactive interpreter.
///
/// Both markers must have the same nonzero byte width; that width is the
/// probe size of the framing reader and the only way idleness is detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMarkers {
    primary: String,
    continuation: String,
}

impl PromptMarkers {
    /// Create a marker pair, validating that both have the same nonzero
    /// byte width.
    ///
    /// # Errors
    ///
    /// Returns a configuration error on empty or unequal-width markers.
    pub fn new(primary: impl Into<String>, continuation: impl Into<String>) -> Result<Self> {
        let primary = primary.into();
        let continuation = continuation.into();
        if primary.is_empty() {
            return Err(CaptureError::config("prompt markers must be non-empty"));
        }
        if primary.len() != continuation.len() {
            return Err(CaptureError::config(format!(
                "prompt markers must have equal width: {primary:?} is {} bytes, {continuation:?} is {} bytes",
                primary.len(),
                continuation.len()
            )));
        }
        Ok(Self {
            primary,
            continuation,
        })
    }

    /// The marker pair of the CPython interactive interpreter.
    #[must_use]
    pub fn python() -> Self {
        Self {
            primary: DEFAULT_PRIMARY_MARKER.to_string(),
            continuation: DEFAULT_CONTINUATION_MARKER.to_string(),
        }
    }

    /// The probe width in bytes.
    #[must_use]
    pub fn width(&self) -> usize {
        self.primary.len()
    }

    /// The primary marker string.
    #[must_use]
    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// The continuation marker string.
    #[must_use]
    pub fn continuation(&self) -> &str {
        &self.continuation
    }

    /// The marker string for the given marker kind.
    #[must_use]
    pub fn as_str(&self, marker: Marker) -> &str {
        match marker {
            Marker::Primary => &self.primary,
            Marker::Continuation => &self.continuation,
        }
    }

    /// Compare a probe-width fragment byte-for-byte against both markers.
    #[must_use]
    pub fn classify(&self, fragment: &[u8]) -> Option<Marker> {
        if fragment == self.primary.as_bytes() {
            Some(Marker::Primary)
        } else if fragment == self.continuation.as_bytes() {
            Some(Marker::Continuation)
        } else {
            None
        }
    }
}

impl Default for PromptMarkers {
    fn default() -> Self {
        Self::python()
    }
}

/// Configuration for a capture session.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// How to spawn the interpreter subprocess.
    pub spawn: repl_pipe::SpawnConfig,

    /// The interpreter's prompt marker pair.
    pub markers: PromptMarkers,

    /// Reserved token introducing directives and signal lines.
    pub reserved_token: String,

    /// Bound on every subprocess read; `None` blocks forever.
    pub read_timeout: Option<Duration>,

    /// Initial default for echoing input lines into the transcript.
    pub show_input: bool,

    /// Initial default for recording output lines into the transcript.
    pub show_output: bool,

    /// Interpreter lines run silently when a registry creates a session.
    pub bootstrap: InitScript,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            spawn: repl_pipe::SpawnConfig::default(),
            markers: PromptMarkers::python(),
            reserved_token: DEFAULT_RESERVED_TOKEN.to_string(),
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            show_input: true,
            show_output: true,
            bootstrap: InitScript::empty(),
        }
    }
}

impl CaptureConfig {
    /// Set the spawn configuration.
    #[must_use]
    pub fn spawn(mut self, spawn: repl_pipe::SpawnConfig) -> Self {
        self.spawn = spawn;
        self
    }

    /// Set the prompt markers.
    #[must_use]
    pub fn markers(mut self, markers: PromptMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// Set the reserved token.
    #[must_use]
    pub fn reserved_token(mut self, token: impl Into<String>) -> Self {
        self.reserved_token = token.into();
        self
    }

    /// Set the read timeout (`None` restores block-forever behavior).
    #[must_use]
    pub const fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the initial display defaults.
    #[must_use]
    pub const fn display_defaults(mut self, show_input: bool, show_output: bool) -> Self {
        self.show_input = show_input;
        self.show_output = show_output;
        self
    }

    /// Set the bootstrap script.
    #[must_use]
    pub fn bootstrap(mut self, script: InitScript) -> Self {
        self.bootstrap = script;
        self
    }
}

/// Capture settings as embedded in a documentation builder's TOML
/// configuration.
///
/// All fields are optional; present fields override the corresponding
/// [`CaptureConfig`] defaults via [`CaptureSettings::apply`].
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureSettings {
    /// Interpreter command.
    pub command: Option<String>,
    /// Interpreter arguments.
    pub args: Option<Vec<String>>,
    /// Primary prompt marker.
    pub primary_marker: Option<String>,
    /// Continuation prompt marker.
    pub continuation_marker: Option<String>,
    /// Reserved directive/signal token.
    pub reserved_token: Option<String>,
    /// Read timeout in seconds; `0` disables the timeout.
    pub read_timeout_secs: Option<u64>,
    /// Initial input echo default.
    pub show_input: Option<bool>,
    /// Initial output recording default.
    pub show_output: Option<bool>,
    /// Bootstrap lines run silently at session creation.
    pub bootstrap: Option<Vec<String>>,
}

impl CaptureSettings {
    /// Parse settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the TOML does not parse or contains
    /// unknown fields.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| CaptureError::config(e.to_string()))
    }

    /// Apply these settings on top of a base configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the resulting markers are invalid.
    pub fn apply(self, mut base: CaptureConfig) -> Result<CaptureConfig> {
        if let Some(command) = self.command {
            base.spawn.command = command;
        }
        if let Some(args) = self.args {
            base.spawn.args = args;
        }
        if self.primary_marker.is_some() || self.continuation_marker.is_some() {
            let primary = self
                .primary_marker
                .unwrap_or_else(|| base.markers.primary().to_string());
            let continuation = self
                .continuation_marker
                .unwrap_or_else(|| base.markers.continuation().to_string());
            base.markers = PromptMarkers::new(primary, continuation)?;
        }
        if let Some(token) = self.reserved_token {
            base.reserved_token = token;
        }
        if let Some(secs) = self.read_timeout_secs {
            base.read_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(show) = self.show_input {
            base.show_input = show;
        }
        if let Some(show) = self.show_output {
            base.show_output = show;
        }
        if let Some(lines) = self.bootstrap {
            base.bootstrap = InitScript::new(lines);
        }
        Ok(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_markers_are_four_bytes() {
        let markers = PromptMarkers::python();
        assert_eq!(markers.width(), 4);
        assert_eq!(markers.primary(), ">>> ");
        assert_eq!(markers.continuation(), "... ");
    }

    #[test]
    fn unequal_widths_rejected() {
        let err = PromptMarkers::new(">>> ", "..").unwrap_err();
        assert!(matches!(err, CaptureError::Config { .. }));
    }

    #[test]
    fn empty_markers_rejected() {
        assert!(PromptMarkers::new("", "").is_err());
    }

    #[test]
    fn classify_matches_exactly() {
        let markers = PromptMarkers::python();
        assert_eq!(markers.classify(b">>> "), Some(Marker::Primary));
        assert_eq!(markers.classify(b"... "), Some(Marker::Continuation));
        assert_eq!(markers.classify(b">>> x"), None);
        assert_eq!(markers.classify(b">>>"), None);
    }

    #[test]
    fn custom_width_markers() {
        let markers = PromptMarkers::new("R> ", "+> ").unwrap();
        assert_eq!(markers.width(), 3);
        assert_eq!(markers.classify(b"R> "), Some(Marker::Primary));
        assert_eq!(markers.classify(b"+> "), Some(Marker::Continuation));
    }

    #[test]
    fn settings_from_toml() {
        let settings = CaptureSettings::from_toml_str(
            r#"
            command = "R"
            args = ["--interactive", "--quiet"]
            primary_marker = "R> "
            continuation_marker = "+> "
            read_timeout_secs = 10
            show_output = false
            "#,
        )
        .unwrap();
        let config = settings.apply(CaptureConfig::default()).unwrap();
        assert_eq!(config.spawn.command, "R");
        assert_eq!(config.markers.width(), 3);
        assert_eq!(config.read_timeout, Some(Duration::from_secs(10)));
        assert!(config.show_input);
        assert!(!config.show_output);
    }

    #[test]
    fn settings_zero_timeout_disables_bound() {
        let settings = CaptureSettings::from_toml_str("read_timeout_secs = 0").unwrap();
        let config = settings.apply(CaptureConfig::default()).unwrap();
        assert_eq!(config.read_timeout, None);
    }

    #[test]
    fn settings_reject_unknown_fields() {
        assert!(CaptureSettings::from_toml_str("no_such_field = 1").is_err());
    }

    #[test]
    fn settings_reject_unequal_marker_override() {
        let settings = CaptureSettings::from_toml_str(r#"primary_marker = ">>>>> ""#).unwrap();
        assert!(settings.apply(CaptureConfig::default()).is_err());
    }
}
