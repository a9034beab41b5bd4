//! CLI-specific error types and mappings.
//!
//! Library errors are flattened into a few categories, each with a
//! sysexits-style exit code.

use nvserve_core::{ConfigError, OptionError};
use nvserve_runtime::{InstallError, ServerError, SupervisorError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Anything without a more specific category.
    #[error("{0}")]
    General(String),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Invalid options, ports or bind addresses.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem, lock or account failures.
    #[error("IO error: {0}")]
    Io(String),

    /// Release download failures.
    #[error("Download error: {0}")]
    Network(String),

    /// Install steps, launches and terminations.
    #[error("Process error: {0}")]
    Process(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::General(_) => 1,
            CliError::Arguments(_) => 2, // EX_USAGE
            CliError::Network(_) => 69,  // EX_UNAVAILABLE
            CliError::Process(_) => 71,  // EX_OSERR
            CliError::Io(_) => 74,       // EX_IOERR
            CliError::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<OptionError> for CliError {
    fn from(err: OptionError) -> Self {
        CliError::Config(err.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}

impl From<InstallError> for CliError {
    fn from(err: InstallError) -> Self {
        let message = err.to_string();
        match err {
            InstallError::Option(_) => CliError::Config(message),
            InstallError::Fetch(_) => CliError::Network(message),
            InstallError::Step { .. } => CliError::Process(message),
            InstallError::Home(_)
            | InstallError::Path(_)
            | InstallError::Chown { .. }
            | InstallError::Prepare { .. } => CliError::Io(message),
        }
    }
}

impl From<SupervisorError> for CliError {
    fn from(err: SupervisorError) -> Self {
        let message = err.to_string();
        match err {
            SupervisorError::InvalidLockName(_) => CliError::Arguments(message),
            SupervisorError::LockUnavailable { .. } | SupervisorError::Record { .. } => {
                CliError::Io(message)
            }
            SupervisorError::Launch { .. } | SupervisorError::Terminate { .. } => {
                CliError::Process(message)
            }
        }
    }
}

impl From<ServerError> for CliError {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Config(e) => e.into(),
            ServerError::Install(e) => e.into(),
            ServerError::Supervisor(e) => e.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::General(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nvserve_core::{ExecError, FetchError, LockStoreError};

    #[test]
    fn test_install_errors_map_by_cause() {
        let fetch = InstallError::Fetch(FetchError::Status {
            url: "https://github.com/x".to_string(),
            status: 404,
        });
        assert_eq!(CliError::from(fetch).exit_code(), 69);

        let step = InstallError::Step {
            step: "extract".to_string(),
            source: ExecError::Exit {
                program: "nvim.appimage".to_string(),
                code: Some(1),
                stderr: String::new(),
            },
        };
        let err = CliError::from(step);
        assert_eq!(err.exit_code(), 71);
        assert!(err.to_string().contains("extract"));
    }

    #[test]
    fn test_supervisor_errors_map_by_cause() {
        let unavailable = SupervisorError::LockUnavailable {
            name: "neovim.pid".to_string(),
            source: LockStoreError::Unavailable {
                target: "/run/neovim.pid.lock".to_string(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            },
        };
        assert_eq!(CliError::from(unavailable).exit_code(), 74);

        let launch = SupervisorError::Launch {
            name: "neovim.pid".to_string(),
            reason: "workspace missing".to_string(),
        };
        assert_eq!(CliError::from(ServerError::from(launch)).exit_code(), 71);
    }

    #[test]
    fn test_config_errors_exit_with_ex_config() {
        let err = CliError::from(ConfigError::InvalidPort("abc".to_string()));
        assert_eq!(err.exit_code(), 78);
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
