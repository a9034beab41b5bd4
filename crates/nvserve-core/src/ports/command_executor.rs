//! External command execution port.

use std::fmt;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// One external command in an ordered pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Short label used in logs and errors ("extract", "symlink").
    pub description: String,
    pub argv: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Step {
    pub fn new<I, S>(description: impl Into<String>, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            description: description.into(),
            argv: argv.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    #[must_use]
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.description, self.argv.join(" "))
    }
}

/// Command execution failures.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Step has an empty command line")]
    EmptyCommand,

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {}{}", exit_label(.code), stderr_suffix(.stderr))]
    Exit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| format!("status {c}"))
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Runs a single step to completion.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(&self, step: &Step) -> Result<(), ExecError>;
}
