//! Resolved server configuration.
//!
//! A [`ServerConfig`] is built once per invocation from the caller's raw
//! inputs and is immutable afterwards.

use std::net::IpAddr;

use serde::Serialize;
use thiserror::Error;

use crate::launch::LaunchStrategy;
use crate::options::{BIND_ADDRESS_OPTION, NEOVIM_OPTIONS, OptionError, OptionValues};

/// Port Neovim listens on when nothing else is configured.
pub const DEFAULT_NEOVIM_PORT: u16 = 9251;

/// Wildcard host used when no bind host is configured.
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(transparent)]
    Option(#[from] OptionError),

    #[error("Invalid port '{0}', expected a number between 1 and 65535")]
    InvalidPort(String),

    #[error("Invalid bind address '{value}': {reason}")]
    InvalidBindAddress { value: String, reason: String },
}

/// The resolved `{user, host, port, options}` tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerConfig {
    user: Option<String>,
    host: String,
    port: u16,
    options: OptionValues,
}

impl ServerConfig {
    /// Resolve raw caller inputs.
    ///
    /// Empty strings count as unset. Host and port fall back to the
    /// `BIND_ADDRESS` option and then to [`DEFAULT_BIND_HOST`] and
    /// [`DEFAULT_NEOVIM_PORT`].
    pub fn resolve(
        user: Option<&str>,
        host: Option<&str>,
        port: Option<&str>,
        options: OptionValues,
    ) -> Result<Self, ConfigError> {
        options.validate(NEOVIM_OPTIONS)?;

        let bind = options.get(BIND_ADDRESS_OPTION)?;
        let (bind_host, bind_port) = parse_bind_address(&bind)?;

        let host = match non_empty(host) {
            Some(explicit) => check_host(explicit, explicit)?.to_string(),
            None => bind_host.unwrap_or_else(|| DEFAULT_BIND_HOST.to_string()),
        };

        let port = match non_empty(port) {
            Some(raw) => parse_port(raw)?,
            None => bind_port.unwrap_or(DEFAULT_NEOVIM_PORT),
        };

        Ok(Self {
            user: non_empty(user).map(str::to_string),
            host,
            port,
            options,
        })
    }

    /// Configuration with every default applied.
    pub fn with_defaults() -> Self {
        Self {
            user: None,
            host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_NEOVIM_PORT,
            options: OptionValues::new(),
        }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    pub const fn options(&self) -> &OptionValues {
        &self.options
    }

    /// Resolve an option; the table was validated at construction.
    pub fn option(&self, name: &str) -> Result<String, OptionError> {
        self.options.get(name)
    }

    /// `host:port` as passed to `nvim --listen`.
    pub fn listen_address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// How the server process should be launched for this user.
    pub fn launch_strategy(&self) -> LaunchStrategy {
        match &self.user {
            Some(user) => LaunchStrategy::AsUser(user.clone()),
            None => LaunchStrategy::Direct,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort(raw.to_string())),
    }
}

/// Split `host`, `host:port`, `:port` or `[v6]:port`.
fn parse_bind_address(raw: &str) -> Result<(Option<String>, Option<u16>), ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok((None, None));
    }

    let invalid = |reason: &str| ConfigError::InvalidBindAddress {
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let (host, port) = if let Some(rest) = raw.strip_prefix('[') {
        let (host, after) = rest
            .split_once(']')
            .ok_or_else(|| invalid("unterminated '['"))?;
        match after {
            "" => (host, None),
            _ => {
                let port = after
                    .strip_prefix(':')
                    .ok_or_else(|| invalid("expected ':' after ']'"))?;
                (host, Some(port))
            }
        }
    } else if raw.matches(':').count() > 1 {
        // Bare IPv6 address without a port
        (raw, None)
    } else {
        match raw.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (raw, None),
        }
    };

    let port = port
        .map(|p| parse_port(p).map_err(|_| invalid("port is not a valid number")))
        .transpose()?;
    let host = match host {
        "" => None,
        host => Some(check_host(host, raw)?.to_string()),
    };

    Ok((host, port))
}

/// Accept an IP address or a plain hostname (`[A-Za-z0-9.-]`).
///
/// The host ends up in a shell command line, so nothing else gets through.
fn check_host<'a>(host: &'a str, value: &str) -> Result<&'a str, ConfigError> {
    let is_hostname = !host.is_empty()
        && !host.starts_with('-')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');

    if host.parse::<IpAddr>().is_ok() || is_hostname {
        Ok(host)
    } else {
        Err(ConfigError::InvalidBindAddress {
            value: value.to_string(),
            reason: format!("'{host}' is not an IP address or hostname"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OPEN_OPTION;

    #[test]
    fn test_defaults_apply_to_empty_inputs() {
        let config = ServerConfig::resolve(None, None, None, OptionValues::new()).unwrap();
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(config.port(), 9251);
        assert_eq!(config.user(), None);
        assert_eq!(config.listen_address(), "0.0.0.0:9251");
        assert_eq!(config, ServerConfig::with_defaults());
    }

    #[test]
    fn test_empty_strings_count_as_unset() {
        let config = ServerConfig::resolve(Some(""), Some(""), Some(" "), OptionValues::new())
            .unwrap();
        assert_eq!(config.user(), None);
        assert_eq!(config.host(), DEFAULT_BIND_HOST);
        assert_eq!(config.port(), DEFAULT_NEOVIM_PORT);
    }

    #[test]
    fn test_explicit_host_and_port_win() {
        let options: OptionValues = [(BIND_ADDRESS_OPTION, "10.0.0.1:7000")]
            .into_iter()
            .collect();
        let config =
            ServerConfig::resolve(Some("dev"), Some("127.0.0.1"), Some("8000"), options).unwrap();
        assert_eq!(config.listen_address(), "127.0.0.1:8000");
        assert_eq!(config.user(), Some("dev"));
        assert_eq!(config.launch_strategy(), LaunchStrategy::AsUser("dev".into()));
    }

    #[test]
    fn test_bind_address_option_fills_unset_fields() {
        let cases = [
            ("127.0.0.1:7000", "127.0.0.1", 7000),
            ("127.0.0.1", "127.0.0.1", DEFAULT_NEOVIM_PORT),
            (":7000", DEFAULT_BIND_HOST, 7000),
            ("[::1]:7000", "::1", 7000),
            ("::", "::", DEFAULT_NEOVIM_PORT),
        ];
        for (bind, host, port) in cases {
            let options: OptionValues = [(BIND_ADDRESS_OPTION, bind)].into_iter().collect();
            let config = ServerConfig::resolve(None, None, None, options).unwrap();
            assert_eq!(config.host(), host, "host for {bind}");
            assert_eq!(config.port(), port, "port for {bind}");
        }
    }

    #[test]
    fn test_ipv6_listen_address_is_bracketed() {
        let config = ServerConfig::resolve(None, Some("::1"), None, OptionValues::new()).unwrap();
        assert_eq!(config.listen_address(), "[::1]:9251");
    }

    #[test]
    fn test_invalid_port_is_a_config_error() {
        for port in ["http", "0", "70000"] {
            assert_eq!(
                ServerConfig::resolve(None, None, Some(port), OptionValues::new()),
                Err(ConfigError::InvalidPort(port.to_string()))
            );
        }
    }

    #[test]
    fn test_invalid_bind_address_is_a_config_error() {
        let options: OptionValues = [(BIND_ADDRESS_OPTION, "localhost:abc")]
            .into_iter()
            .collect();
        assert!(matches!(
            ServerConfig::resolve(None, None, None, options),
            Err(ConfigError::InvalidBindAddress { .. })
        ));
    }

    #[test]
    fn test_shell_metacharacters_in_host_are_rejected() {
        let hosts = [
            "127.0.0.1;touch /tmp/nvserve_pwned;#",
            "x y",
            "$(id)",
            "`id`",
            "host|cat",
            "-oProxyCommand",
        ];
        for host in hosts {
            let options: OptionValues = [(BIND_ADDRESS_OPTION, host)].into_iter().collect();
            assert!(
                matches!(
                    ServerConfig::resolve(None, None, None, options),
                    Err(ConfigError::InvalidBindAddress { .. })
                ),
                "bind address {host:?} must be rejected"
            );
            assert!(
                matches!(
                    ServerConfig::resolve(None, Some(host), None, OptionValues::new()),
                    Err(ConfigError::InvalidBindAddress { .. })
                ),
                "host {host:?} must be rejected"
            );
        }
    }

    #[test]
    fn test_hostnames_and_addresses_are_accepted() {
        for host in ["localhost", "dev-box.internal", "10.1.2.3", "::1", "fe80::1"] {
            let config = ServerConfig::resolve(None, Some(host), None, OptionValues::new()).unwrap();
            assert_eq!(config.host(), host);
        }
    }

    #[test]
    fn test_invalid_enum_option_fails_resolution() {
        let options: OptionValues = [(OPEN_OPTION, "maybe")].into_iter().collect();
        assert!(matches!(
            ServerConfig::resolve(None, None, None, options),
            Err(ConfigError::Option(OptionError::InvalidValue { .. }))
        ));
    }
}
