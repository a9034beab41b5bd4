//! Start command handler.

use std::path::Path;

use nvserve_core::EnsureOutcome;

use crate::bootstrap::CliContext;
use crate::commands::ServerArgs;
use crate::error::CliError;

/// Install (unless skipped), then ensure exactly one server runs.
pub async fn execute(
    ctx: &CliContext,
    workspace: &Path,
    skip_install: bool,
    args: &ServerArgs,
) -> Result<(), CliError> {
    let server = ctx.server(args.resolve()?);

    if !skip_install {
        let installed = server.install().await?;
        tracing::debug!(%installed, "Install check done");
    }

    let outcome = server.start(workspace)?;
    println!("{}", describe(&outcome));
    println!("listening on {}", server.listen_address());
    Ok(())
}

fn describe(outcome: &EnsureOutcome) -> String {
    match outcome {
        EnsureOutcome::Started { pid } => format!("started pid {pid}"),
        EnsureOutcome::AlreadyRunning { pid } => format!("already running pid {pid}"),
    }
}
