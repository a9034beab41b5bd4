//! Command-line front end for nvserve.
//!
//! `main.rs` is the composition root; everything else is exposed here so
//! argument parsing and error mapping can be tested without a process.

#![deny(unsafe_code)]

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap, init_tracing};
pub use commands::{Commands, ServerArgs, TargetArgs};
pub use error::CliError;
pub use parser::Cli;
