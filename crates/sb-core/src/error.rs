//! Core error types for shellbot

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::types::ConfigOption;

/// Errors raised while opening a remote session
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Port value is not a valid TCP port
    #[error("Invalid port: {0}")]
    InvalidPort(String),

    /// Connection attempt exceeded the configured timeout
    #[error("Connection timed out after {0:?}")]
    Timeout(Duration),

    /// Server rejected the username/password pair
    #[error("Authentication failed: the server rejected the username or password")]
    AuthRejected,

    /// Transport-level connection error
    #[error("Failed to connect to {address}: {reason}")]
    Connect { address: String, reason: String },

    /// Channel could not be opened on an established session
    #[error("Channel error: {0}")]
    Channel(String),
}

/// Errors resolved inside the processing of a single operator event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Connect requested before all parameters were set
    #[error("Configuration incomplete, missing: {}", join_options(.missing))]
    ConfigurationIncomplete { missing: Vec<ConfigOption> },

    /// Event not valid for the current state
    #[error("Undefined request")]
    UndefinedRequest,

    /// Command requested without an open remote session
    #[error("Not connected")]
    NotConnected,
}

fn join_options(options: &[ConfigOption]) -> String {
    options
        .iter()
        .map(ConfigOption::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
