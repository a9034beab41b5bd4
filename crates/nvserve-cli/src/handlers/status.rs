//! Status command handler.

use crate::bootstrap::CliContext;
use crate::error::CliError;

pub fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let status = ctx.default_server().status()?;
    println!("neovim: {status}");
    Ok(())
}
