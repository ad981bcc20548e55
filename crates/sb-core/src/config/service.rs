//! Service daemon configuration

use serde::{Deserialize, Serialize};

use super::BridgeConfig;

/// Default gateway address (localhost only)
pub const DEFAULT_GATEWAY_ADDRESS: &str = "127.0.0.1:22240";

/// Configuration for the shellbot service daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Address the front-end gateway listens on
    pub gateway_address: String,

    /// Operator identities allowed to use the service
    pub allowed_operators: Vec<String>,

    /// SSH bridge limits
    pub bridge: BridgeConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            gateway_address: DEFAULT_GATEWAY_ADDRESS.to_string(),
            allowed_operators: vec![],
            bridge: BridgeConfig::default(),
        }
    }
}
