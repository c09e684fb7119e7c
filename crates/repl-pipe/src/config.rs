//! Spawn configuration for interpreter subprocesses.

use std::collections::HashMap;
use std::path::PathBuf;

/// Default interpreter command.
pub const DEFAULT_COMMAND: &str = "python3";

/// Default interpreter arguments (interactive, quiet startup).
pub const DEFAULT_ARGS: &[&str] = &["-i", "-q"];

/// Configuration for spawning an interpreter subprocess.
///
/// The child is always spawned with stdin piped and stdout/stderr merged
/// into a single pipe, inheriting the current working directory unless one
/// is set explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnConfig {
    /// The command to execute.
    pub command: String,

    /// Command arguments.
    pub args: Vec<String>,

    /// Working directory for the process (current directory when `None`).
    pub working_dir: Option<PathBuf>,

    /// Extra environment variables to set on top of the inherited ones.
    pub env: HashMap<String, String>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            args: DEFAULT_ARGS.iter().map(ToString::to_string).collect(),
            working_dir: None,
            env: HashMap::new(),
        }
    }
}

impl SpawnConfig {
    /// Create a configuration for the given command with no arguments.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            working_dir: None,
            env: HashMap::new(),
        }
    }

    /// Set the command arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Append a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }

    /// Add an environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}
