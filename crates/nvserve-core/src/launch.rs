//! Launch specifications for supervised processes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// An OS command to start, described without spawning it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl LaunchSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

/// How a shell payload is turned into a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchStrategy {
    /// `sh -c <payload>` as the invoking user.
    Direct,
    /// `su <user> -c <payload>`.
    AsUser(String),
}

impl LaunchStrategy {
    /// Wrap a shell payload in the command for this strategy.
    pub fn wrap(&self, payload: impl Into<String>) -> LaunchSpec {
        match self {
            Self::Direct => LaunchSpec::new("sh").arg("-c").arg(payload),
            Self::AsUser(user) => LaunchSpec::new("su").arg(user.as_str()).arg("-c").arg(payload),
        }
    }
}
