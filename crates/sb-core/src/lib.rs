//! sb-core: Core abstractions and configuration for shellbot
//!
//! This crate provides the domain types, the remote bridge traits, the
//! gateway wire protocol and the configuration structures shared by the
//! bridge, the service daemon and the console front end.

pub mod config;
pub mod error;
pub mod gateway;
pub mod traits;
pub mod types;

pub use error::{BridgeError, SessionError};
pub use types::{CommandResult, ConfigOption, Configuration, ConnectionParams, OperatorId};
