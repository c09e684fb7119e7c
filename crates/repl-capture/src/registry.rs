//! Per-document session registry.
//!
//! One live interpreter per document identity, created lazily on first use
//! and torn down when the document is re-read or the build finishes. The
//! registry is an explicit object owned by the build-orchestration context;
//! its lifecycle is tied to one build run, not to process state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::CaptureConfig;
use crate::error::Result;
use crate::session::ReplSession;

/// A shared handle to a live session.
///
/// The protocol is serial per session; the mutex serializes callers that
/// hold the same handle.
pub type SessionHandle = Arc<Mutex<ReplSession>>;

/// Registry mapping document identities to live sessions.
#[derive(Debug)]
pub struct SessionRegistry {
    config: CaptureConfig,
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    /// Create a registry that spawns sessions from the given configuration.
    #[must_use]
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// The configuration used for newly created sessions.
    #[must_use]
    pub const fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Return the session for a document, spawning and bootstrapping one if
    /// none exists.
    ///
    /// The registry lock is held across creation, so concurrent callers for
    /// the same document cannot double-spawn an interpreter.
    ///
    /// # Errors
    ///
    /// Returns an error if spawning or bootstrapping fails; a session whose
    /// bootstrap fails is killed and not registered.
    pub async fn get_or_create(&self, document_id: &str) -> Result<SessionHandle> {
        let mut sessions = self.sessions.lock().await;
        if let Some(handle) = sessions.get(document_id) {
            return Ok(Arc::clone(handle));
        }

        tracing::debug!(document_id, "creating interpreter session");
        let mut session = ReplSession::spawn(&self.config).await?;
        if let Err(error) = session.bootstrap(&self.config.bootstrap).await {
            tracing::warn!(document_id, %error, "bootstrap failed, killing interpreter");
            let _ = session.kill().await;
            return Err(error);
        }

        let handle = Arc::new(Mutex::new(session));
        sessions.insert(document_id.to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Terminate and remove the session for a document, if present.
    ///
    /// Killing an absent or already-killed session is a no-op.
    pub async fn kill(&self, document_id: &str) {
        let removed = self.sessions.lock().await.remove(document_id);
        if let Some(handle) = removed {
            if let Err(error) = handle.lock().await.kill().await {
                tracing::warn!(document_id, %error, "failed to kill interpreter");
            }
        }
    }

    /// Terminate and remove every session.
    ///
    /// The final safety sweep at the end of a build; safe to call even if
    /// some or all sessions were already individually killed.
    pub async fn kill_all(&self) {
        let drained: Vec<(String, SessionHandle)> =
            self.sessions.lock().await.drain().collect();
        for (document_id, handle) in drained {
            if let Err(error) = handle.lock().await.kill().await {
                tracing::warn!(document_id, %error, "failed to kill interpreter");
            }
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether the registry holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
