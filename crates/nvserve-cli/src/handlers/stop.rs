//! Stop command handler.

use crate::bootstrap::CliContext;
use crate::error::CliError;

pub fn execute(ctx: &CliContext) -> Result<(), CliError> {
    match ctx.default_server().stop()? {
        Some(pid) => println!("stopped pid {pid}"),
        None => println!("not running"),
    }
    Ok(())
}
