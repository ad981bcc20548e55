//! Core domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Identity of an operator as reported by the front end
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperatorId(pub String);

impl OperatorId {
    /// Create a new operator ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OperatorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OperatorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One of the four SSH connection parameters an operator fills in
///
/// The declaration order is the menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigOption {
    Hostname,
    Port,
    Username,
    Password,
}

impl ConfigOption {
    /// All options in menu order
    pub const ALL: [ConfigOption; 4] = [
        ConfigOption::Hostname,
        ConfigOption::Port,
        ConfigOption::Username,
        ConfigOption::Password,
    ];

    /// Lowercase name used in button payloads and prompts
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigOption::Hostname => "hostname",
            ConfigOption::Port => "port",
            ConfigOption::Username => "username",
            ConfigOption::Password => "password",
        }
    }
}

impl fmt::Display for ConfigOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hostname" => Ok(ConfigOption::Hostname),
            "port" => Ok(ConfigOption::Port),
            "username" => Ok(ConfigOption::Username),
            "password" => Ok(ConfigOption::Password),
            other => Err(format!("unknown configuration option: {}", other)),
        }
    }
}

/// Connection parameters accumulated for one operator
///
/// A missing key means the option has not been set yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    values: BTreeMap<ConfigOption, String>,
}

impl Configuration {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of an option
    pub fn get(&self, option: ConfigOption) -> Option<&str> {
        self.values.get(&option).map(String::as_str)
    }

    /// Set (or replace) the value of an option
    pub fn set(&mut self, option: ConfigOption, value: impl Into<String>) {
        self.values.insert(option, value.into());
    }

    /// Remove every value
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Whether no option has been set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether any option holds a non-empty value
    pub fn any_set(&self) -> bool {
        self.values.values().any(|v| !v.is_empty())
    }

    /// Whether all four options hold non-empty values
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Options that are absent or empty, in menu order
    pub fn missing(&self) -> Vec<ConfigOption> {
        ConfigOption::ALL
            .into_iter()
            .filter(|option| self.get(*option).map_or(true, str::is_empty))
            .collect()
    }

    /// Set options and their values, in menu order
    pub fn iter(&self) -> impl Iterator<Item = (ConfigOption, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Build connection parameters, only when the configuration is complete
    pub fn to_params(&self) -> Option<ConnectionParams> {
        if !self.is_complete() {
            return None;
        }
        Some(ConnectionParams {
            hostname: self.get(ConfigOption::Hostname)?.to_string(),
            port: self.get(ConfigOption::Port)?.to_string(),
            username: self.get(ConfigOption::Username)?.to_string(),
            password: self.get(ConfigOption::Password)?.to_string(),
        })
    }
}

/// Parameters handed to the bridge to open a remote session
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub hostname: String,
    pub port: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Outcome of one remote command execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// The command produced output
    Output(String),
    /// The command ran and produced nothing but whitespace
    EmptyOutput,
    /// The command could not be executed or timed out
    Failure(String),
}

impl CommandResult {
    /// Classify captured stdout/stderr text
    pub fn from_captured(text: &str) -> Self {
        if text.trim().is_empty() {
            CommandResult::EmptyOutput
        } else {
            CommandResult::Output(text.trim_end().to_string())
        }
    }
}
