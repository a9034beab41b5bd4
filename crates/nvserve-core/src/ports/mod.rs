//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No reqwest, nix or tokio types in any signature
//! - Lock stores hand out a [`LockGuard`]; every record operation takes it,
//!   so probing and publishing cannot happen outside the exclusive section
//! - Launchers never keep handles: liveness is re-derived from the record

pub mod artifact_fetcher;
pub mod command_executor;
pub mod lock_store;
pub mod process_launcher;
pub mod user_accounts;

pub use artifact_fetcher::{ArtifactFetcher, FetchError};
pub use command_executor::{CommandExecutor, ExecError, Step};
pub use lock_store::{LockGuard, LockStore, LockStoreError};
pub use process_launcher::ProcessLauncher;
pub use user_accounts::{AccountError, UserAccounts};
