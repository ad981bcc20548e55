//! Remote bridge configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_secs;

/// Limits applied by the SSH bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Upper bound for TCP connect, handshake and authentication
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,

    /// Upper bound for a single remote command
    #[serde(with = "duration_secs")]
    pub command_timeout: Duration,

    /// SSH keepalive interval for idle sessions
    #[serde(with = "duration_secs")]
    pub keepalive_interval: Duration,

    /// Captured output beyond this many bytes is truncated
    pub max_output_bytes: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            command_timeout: Duration::from_secs(30),
            keepalive_interval: Duration::from_secs(30),
            max_output_bytes: 4000,
        }
    }
}
