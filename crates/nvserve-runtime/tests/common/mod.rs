//! Shared helpers for nvserve-runtime integration tests.

pub mod fakes;
