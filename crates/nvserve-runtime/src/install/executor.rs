//! Runs pipeline steps as child processes.

use std::process::Stdio;

use async_trait::async_trait;
use nvserve_core::{CommandExecutor, ExecError, Step};
use tokio::process::Command;
use tracing::debug;

/// How much of stderr is kept for error messages.
const STDERR_TAIL: usize = 2048;

/// Executes each step with `tokio::process` and waits for it to finish.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandExecutor;

impl TokioCommandExecutor {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for TokioCommandExecutor {
    async fn run(&self, step: &Step) -> Result<(), ExecError> {
        let (program, args) = step.argv.split_first().ok_or(ExecError::EmptyCommand)?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        if let Some(dir) = &step.cwd {
            cmd.current_dir(dir);
        }

        debug!(step = %step, "Running");
        let output = cmd.output().await.map_err(|source| ExecError::Spawn {
            program: program.clone(),
            source,
        })?;

        if output.status.success() {
            return Ok(());
        }

        Err(ExecError::Exit {
            program: program.clone(),
            code: output.status.code(),
            stderr: stderr_tail(&output.stderr),
        })
    }
}

fn stderr_tail(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim();
    if text.len() <= STDERR_TAIL {
        return text.to_string();
    }
    let mut start = text.len() - STDERR_TAIL;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].to_string()
}
