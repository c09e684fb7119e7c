//! Out-of-band signal lines.
//!
//! Code running inside the interpreter reports side effects back to the
//! driving process by printing a line of the form
//! `<token><kind>:<payload>`, e.g. `#repl:img:/build/_images/fig-1.svg`
//! printed by a plotting backend after saving a figure. These lines are
//! infrastructure, not program output: they are parsed into [`Signal`]
//! values once, at the stream boundary, and always survive output
//! suppression.

/// The signal kind carried by artifact reports (a generated file path).
pub const ARTIFACT_KIND: &str = "img";

/// A structured out-of-band message from the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    kind: String,
    payload: String,
}

impl Signal {
    /// Create a signal with an arbitrary kind.
    #[must_use]
    pub fn new(kind: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: payload.into(),
        }
    }

    /// Create an artifact signal carrying a generated file path.
    #[must_use]
    pub fn artifact(path: impl Into<String>) -> Self {
        Self::new(ARTIFACT_KIND, path)
    }

    /// Parse an output line as a signal, if it is one.
    ///
    /// A signal line starts with the reserved token followed by a non-empty
    /// kind, a colon, and the payload. Anything else is ordinary output.
    #[must_use]
    pub fn parse(line: &str, token: &str) -> Option<Self> {
        let rest = line.strip_prefix(token)?;
        let (kind, payload) = rest.split_once(':')?;
        if kind.is_empty() {
            return None;
        }
        Some(Self::new(kind, payload))
    }

    /// The signal kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The signal payload.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Whether this is an artifact (generated file) signal.
    #[must_use]
    pub fn is_artifact(&self) -> bool {
        self.kind == ARTIFACT_KIND
    }

    /// Render the signal back to its wire form.
    #[must_use]
    pub fn to_line(&self, token: &str) -> String {
        format!("{token}{}:{}", self.kind, self.payload)
    }
}
