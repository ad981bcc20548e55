//! Outbound SSH connector
//!
//! Turns the four operator-supplied parameters into an authenticated
//! session on the remote host.

use std::sync::Arc;

use async_trait::async_trait;
use russh::client::{self, Config, Handle};
use russh::Disconnect;
use russh_keys::key::PublicKey;

use sb_core::config::BridgeConfig;
use sb_core::traits::RemoteConnector;
use sb_core::{BridgeError, ConnectionParams};

use crate::shell::SshShell;

/// Opens password-authenticated SSH sessions
pub struct SshConnector {
    /// Timeouts and output limits
    config: BridgeConfig,
}

impl SshConnector {
    /// Create a new connector
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    fn ssh_config(&self) -> Arc<Config> {
        Arc::new(Config {
            keepalive_interval: Some(self.config.keepalive_interval),
            ..Default::default()
        })
    }

    /// TCP connect, handshake and password authentication
    async fn establish(
        &self,
        params: &ConnectionParams,
        port: u16,
        address: &str,
    ) -> Result<Handle<ClientHandler>, BridgeError> {
        tracing::debug!("Connecting to {}", address);
        let handler = ClientHandler::new(address.to_string());
        let target = (params.hostname.as_str(), port);
        let mut session = client::connect(self.ssh_config(), target, handler)
            .await
            .map_err(|e| BridgeError::Connect {
                address: address.to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!("Authenticating as user '{}'", params.username);
        let authenticated = match session
            .authenticate_password(params.username.clone(), params.password.clone())
            .await
        {
            Ok(authenticated) => authenticated,
            Err(e) => {
                disconnect(&session, address).await;
                return Err(BridgeError::Connect {
                    address: address.to_string(),
                    reason: format!("authentication error: {}", e),
                });
            }
        };

        if !authenticated {
            disconnect(&session, address).await;
            return Err(BridgeError::AuthRejected);
        }

        Ok(session)
    }
}

#[async_trait]
impl RemoteConnector for SshConnector {
    type Shell = SshShell;

    async fn connect(&self, params: &ConnectionParams) -> Result<SshShell, BridgeError> {
        let port = parse_port(&params.port)?;
        let address = format!("{}:{}", params.hostname, port);

        // Dropping the in-flight future on timeout drops the half-open transport with it
        let session = tokio::time::timeout(
            self.config.connect_timeout,
            self.establish(params, port, &address),
        )
        .await
        .map_err(|_| BridgeError::Timeout(self.config.connect_timeout))
        .and_then(|result| result)
        .map_err(|e| {
            tracing::warn!("SSH connection to {} failed: {}", address, e);
            e
        })?;

        tracing::info!("Connected to {} as {}", address, params.username);
        Ok(SshShell::new(session, address, self.config.clone()))
    }
}

/// Parse a port value entered by the operator
pub(crate) fn parse_port(value: &str) -> Result<u16, BridgeError> {
    match value.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(BridgeError::InvalidPort(value.to_string())),
        Ok(port) => Ok(port),
    }
}

pub(crate) async fn disconnect(session: &Handle<ClientHandler>, address: &str) {
    if let Err(e) = session
        .disconnect(Disconnect::ByApplication, "closing", "en")
        .await
    {
        tracing::debug!("Disconnect from {} reported: {}", address, e);
    }
}

/// SSH client handler for operator sessions
pub(crate) struct ClientHandler {
    /// Remote address, for logging
    address: String,
}

impl ClientHandler {
    fn new(address: String) -> Self {
        Self { address }
    }
}

#[async_trait]
impl client::Handler for ClientHandler {
    type Error = russh::Error;

    /// Accept the server key; operators connect to hosts they name themselves
    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        tracing::info!(
            "Host key for {}: {}",
            self.address,
            server_public_key.fingerprint()
        );
        Ok(true)
    }
}
