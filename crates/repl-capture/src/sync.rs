//! Synchronous wrappers for capture operations.
//!
//! Documentation builders are typically synchronous; this module wraps the
//! async session and registry behind blocking methods, each owning a
//! current-thread tokio runtime.

use tokio::runtime::{Builder, Runtime};

use crate::bootstrap::InitScript;
use crate::config::CaptureConfig;
use crate::error::{CaptureError, Result};
use crate::registry::SessionRegistry;
use crate::session::{DisplayOverride, DisplayState, ReplSession};
use crate::transcript::TranscriptLine;

fn runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CaptureError::io_context("creating tokio runtime", e))
}

/// A blocking capture session.
#[derive(Debug)]
pub struct SyncSession {
    /// The tokio runtime.
    runtime: Runtime,
    /// The inner async session.
    inner: ReplSession,
}

impl SyncSession {
    /// Spawn the configured interpreter and perform the startup handshake.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime, spawn, or handshake fails.
    pub fn spawn(config: &CaptureConfig) -> Result<Self> {
        let runtime = runtime()?;
        let inner = runtime.block_on(ReplSession::spawn(config))?;
        Ok(Self { runtime, inner })
    }

    /// Submit input lines using the session's persistent display defaults.
    ///
    /// # Errors
    ///
    /// See [`ReplSession::communicate`].
    pub fn communicate<I, S>(&mut self, lines: I) -> Result<Vec<TranscriptLine>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.runtime.block_on(self.inner.communicate(lines))
    }

    /// Submit input lines with per-invocation display overrides.
    ///
    /// # Errors
    ///
    /// See [`ReplSession::communicate_with`].
    pub fn communicate_with<I, S>(
        &mut self,
        lines: I,
        overrides: DisplayOverride,
    ) -> Result<Vec<TranscriptLine>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.runtime
            .block_on(self.inner.communicate_with(lines, overrides))
    }

    /// Run a bootstrap script, requiring it to be silent.
    ///
    /// # Errors
    ///
    /// See [`ReplSession::bootstrap`].
    pub fn bootstrap(&mut self, script: &InitScript) -> Result<()> {
        self.runtime.block_on(self.inner.bootstrap(script))
    }

    /// The interpreter's process ID, if it is still running.
    #[must_use]
    pub const fn pid(&self) -> Option<u32> {
        self.inner.pid()
    }

    /// The session's persistent display defaults.
    #[must_use]
    pub const fn display(&self) -> DisplayState {
        self.inner.display()
    }

    /// Whether the interpreter is idle at the primary prompt.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.inner.is_idle()
    }

    /// Terminate the interpreter. Idempotent.
    ///
    /// # Errors
    ///
    /// See [`ReplSession::kill`].
    pub fn kill(&mut self) -> Result<()> {
        self.runtime.block_on(self.inner.kill())
    }
}

/// A blocking per-document session registry.
#[derive(Debug)]
pub struct SyncRegistry {
    /// The tokio runtime.
    runtime: Runtime,
    /// The inner async registry.
    inner: SessionRegistry,
}

impl SyncRegistry {
    /// Create a registry that spawns sessions from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be created.
    pub fn new(config: CaptureConfig) -> Result<Self> {
        Ok(Self {
            runtime: runtime()?,
            inner: SessionRegistry::new(config),
        })
    }

    /// Run one invocation against a document's session, creating the
    /// session first if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if session creation or the invocation fails.
    pub fn communicate<I, S>(
        &self,
        document_id: &str,
        lines: I,
        overrides: DisplayOverride,
    ) -> Result<Vec<TranscriptLine>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.runtime.block_on(async {
            let handle = self.inner.get_or_create(document_id).await?;
            let mut session = handle.lock().await;
            session.communicate_with(lines, overrides).await
        })
    }

    /// Terminate and remove the session for a document, if present.
    pub fn kill(&self, document_id: &str) {
        self.runtime.block_on(self.inner.kill(document_id));
    }

    /// Terminate and remove every session.
    pub fn kill_all(&self) {
        self.runtime.block_on(self.inner.kill_all());
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runtime.block_on(self.inner.len())
    }

    /// Whether the registry holds no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runtime.block_on(self.inner.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranscriptLine;

    // Minimal fixed-prompt interpreter for exercising the blocking facade.
    const FAKE_REPL: &str = r#"
printf '>>> '
while IFS= read -r line; do
  case "$line" in
    'echo '*) printf '%s\n' "${line#echo }" ;;
  esac
  printf '>>> '
done
"#;

    fn fake_config() -> CaptureConfig {
        CaptureConfig::default().spawn(repl_pipe::SpawnConfig::new("sh").args(["-c", FAKE_REPL]))
    }

    #[test]
    fn blocking_round_trip() {
        let mut session = SyncSession::spawn(&fake_config()).expect("spawn fake repl");
        let transcript = session.communicate(["echo hello"]).expect("communicate");
        assert_eq!(
            transcript,
            vec![
                TranscriptLine::Text(">>> echo hello".to_string()),
                TranscriptLine::Text("hello".to_string()),
            ]
        );
        assert!(session.is_idle());
        session.kill().expect("kill");
        session.kill().expect("second kill is a no-op");
    }

    #[test]
    fn blocking_registry_round_trip() {
        let registry = SyncRegistry::new(fake_config()).expect("registry");
        let transcript = registry
            .communicate("doc.rst", ["echo one"], DisplayOverride::none())
            .expect("communicate");
        assert_eq!(transcript.len(), 2);
        assert_eq!(registry.len(), 1);
        registry.kill_all();
        assert!(registry.is_empty());
    }
}
