//! Command handlers.
//!
//! Handlers are thin: resolve arguments, call the server facade, print the
//! result. Progress goes through `tracing`; stdout carries only results.

pub mod install;
pub mod options;
pub mod paths;
pub mod start;
pub mod status;
pub mod stop;
