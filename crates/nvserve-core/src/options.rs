//! Named configuration options and their resolution.
//!
//! Options are declared statically in [`NEOVIM_OPTIONS`]. Callers hand in a
//! `name → value` map ([`OptionValues`]) per invocation; a value that is
//! missing falls back to the declared default, and a value outside a
//! declared enum is rejected rather than coerced.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Release version of the Neovim AppImage to download.
pub const VERSION_OPTION: &str = "VERSION";
/// Whether the calling tool should forward the listen port. Passed through.
pub const FORWARD_PORTS_OPTION: &str = "FORWARD_PORTS";
/// `host`, `host:port` or `:port` the server should listen on.
pub const BIND_ADDRESS_OPTION: &str = "BIND_ADDRESS";
/// Whether the calling tool should open a client after start. Passed through.
pub const OPEN_OPTION: &str = "OPEN";
/// Directory exported as `XDG_CONFIG_HOME` to the launched editor.
pub const CONFIG_DIRECTORY_OPTION: &str = "CONFIG_DIRECTORY";

const BOOL_VALUES: &[&str] = &["true", "false"];

/// Declaration of a single named option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub default: &'static str,
    /// Legal values; empty means free-form.
    pub allowed: &'static [&'static str],
}

impl OptionSpec {
    /// Check `value` against the declared enum, if any.
    pub fn accepts(&self, value: &str) -> bool {
        self.allowed.is_empty() || self.allowed.contains(&value)
    }
}

/// The option table for the Neovim server.
pub const NEOVIM_OPTIONS: &[OptionSpec] = &[
    OptionSpec {
        name: VERSION_OPTION,
        description: "The version for the neovim binary",
        default: "latest",
        allowed: &[],
    },
    OptionSpec {
        name: FORWARD_PORTS_OPTION,
        description: "If the calling tool should automatically do port-forwarding",
        default: "true",
        allowed: BOOL_VALUES,
    },
    OptionSpec {
        name: BIND_ADDRESS_OPTION,
        description: "The address to bind Neovim to. E.g. 0.0.0.0:12345",
        default: "",
        allowed: &[],
    },
    OptionSpec {
        name: OPEN_OPTION,
        description: "If the calling tool should automatically open Neovim",
        default: "true",
        allowed: BOOL_VALUES,
    },
    OptionSpec {
        name: CONFIG_DIRECTORY_OPTION,
        description: "Config directory for Neovim",
        default: "",
        allowed: &[],
    },
];

/// Errors raised while resolving option values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OptionError {
    #[error("Unknown option '{name}'")]
    Unknown { name: String },

    #[error("Invalid value '{value}' for option {name}, expected one of: {allowed}")]
    InvalidValue {
        name: String,
        value: String,
        allowed: String,
    },

    #[error("Malformed option assignment '{0}', expected KEY=VALUE")]
    MalformedAssignment(String),
}

/// Caller-supplied option values, keyed by option name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionValues(BTreeMap<String, String>);

impl OptionValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    /// Raw value as supplied, without default fallback.
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse `KEY=VALUE` assignments as given on the command line.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self, OptionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = Self::new();
        for assignment in assignments {
            let assignment = assignment.as_ref();
            let (name, value) = assignment
                .split_once('=')
                .filter(|(name, _)| !name.trim().is_empty())
                .ok_or_else(|| OptionError::MalformedAssignment(assignment.to_string()))?;
            values.insert(name.trim(), value);
        }
        Ok(values)
    }

    /// Resolve `name` against the Neovim option table.
    pub fn get(&self, name: &str) -> Result<String, OptionError> {
        self.resolve(NEOVIM_OPTIONS, name)
    }

    /// Resolve `name` against `table`, falling back to the declared default.
    pub fn resolve(&self, table: &[OptionSpec], name: &str) -> Result<String, OptionError> {
        let spec = find_spec(table, name)?;
        match self.0.get(name) {
            Some(value) => check_value(spec, value).map(|()| value.clone()),
            None => Ok(spec.default.to_string()),
        }
    }

    /// Reject unknown names and out-of-enum values in one pass.
    pub fn validate(&self, table: &[OptionSpec]) -> Result<(), OptionError> {
        for (name, value) in &self.0 {
            let spec = find_spec(table, name)?;
            check_value(spec, value)?;
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for OptionValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let default = if self.default.is_empty() {
            "\"\""
        } else {
            self.default
        };
        write!(f, "{} (default: {default}", self.name)?;
        if !self.allowed.is_empty() {
            write!(f, ", one of: {}", self.allowed.join("|"))?;
        }
        write!(f, ") - {}", self.description)
    }
}

fn find_spec<'a>(table: &'a [OptionSpec], name: &str) -> Result<&'a OptionSpec, OptionError> {
    table
        .iter()
        .find(|spec| spec.name == name)
        .ok_or_else(|| OptionError::Unknown {
            name: name.to_string(),
        })
}

fn check_value(spec: &OptionSpec, value: &str) -> Result<(), OptionError> {
    if spec.accepts(value) {
        Ok(())
    } else {
        Err(OptionError::InvalidValue {
            name: spec.name.to_string(),
            value: value.to_string(),
            allowed: spec.allowed.join(", "),
        })
    }
}
