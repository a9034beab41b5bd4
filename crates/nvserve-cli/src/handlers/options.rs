//! Options command handler.

use nvserve_core::NEOVIM_OPTIONS;

use crate::error::CliError;

/// Print the option table, one line per option or as JSON.
pub fn execute(json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(NEOVIM_OPTIONS)?);
    } else {
        for spec in NEOVIM_OPTIONS {
            println!("{spec}");
        }
    }
    Ok(())
}
