//! Install command handler.

use crate::bootstrap::CliContext;
use crate::commands::TargetArgs;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext, target: &TargetArgs) -> Result<(), CliError> {
    let server = ctx.server(target.resolve()?);
    let outcome = server.install().await?;
    println!("Neovim {outcome}");
    Ok(())
}
