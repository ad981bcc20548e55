//! Open SSH session that runs one command per exec channel

use std::time::Duration;

use async_trait::async_trait;
use russh::client::{Handle, Msg};
use russh::{Channel, ChannelMsg};
use tokio::time::{timeout_at, Instant};

use sb_core::config::BridgeConfig;
use sb_core::traits::RemoteShell;
use sb_core::{BridgeError, CommandResult};

use crate::connector::{disconnect, ClientHandler};
use crate::output::CapturedOutput;

/// Extended data stream number of stderr
const SSH_EXTENDED_DATA_STDERR: u32 = 1;

/// Upper bound for closing an abandoned channel
const CHANNEL_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// An authenticated SSH session owned by one operator
///
/// Every command gets a fresh exec channel, so each one starts in the
/// remote user's home directory.
pub struct SshShell {
    /// SSH session handle, `None` once closed
    session: Option<Handle<ClientHandler>>,
    /// Remote address, for logging
    address: String,
    /// Timeouts and output limits
    config: BridgeConfig,
}

impl SshShell {
    pub(crate) fn new(session: Handle<ClientHandler>, address: String, config: BridgeConfig) -> Self {
        Self {
            session: Some(session),
            address,
            config,
        }
    }
}

impl SshShell {
    fn timed_out(&self) -> CommandResult {
        tracing::warn!("Command on {} timed out", self.address);
        CommandResult::Failure(format!(
            "command timed out after {:?}",
            self.config.command_timeout
        ))
    }
}

#[async_trait]
impl RemoteShell for SshShell {
    async fn run(&mut self, command: &str) -> CommandResult {
        let Some(session) = self.session.as_ref() else {
            return CommandResult::Failure("the remote session is closed".to_string());
        };

        tracing::debug!("Running command on {}", self.address);
        let deadline = Instant::now() + self.config.command_timeout;

        let mut channel = match timeout_at(deadline, open_exec(session, command)).await {
            Ok(Ok(channel)) => channel,
            Ok(Err(e)) => {
                tracing::warn!("Command on {} failed: {}", self.address, e);
                return CommandResult::Failure(e.to_string());
            }
            Err(_) => return self.timed_out(),
        };

        let mut output = CapturedOutput::new(self.config.max_output_bytes);
        let result = match timeout_at(deadline, collect(&mut channel, &mut output)).await {
            Ok(Ok(())) => return output.finish(),
            Ok(Err(e)) => {
                tracing::warn!("Command on {} failed: {}", self.address, e);
                CommandResult::Failure(e.to_string())
            }
            Err(_) => self.timed_out(),
        };

        // Dropping the channel leaves it and its remote process open
        close_channel(&channel, &self.address).await;
        result
    }

    async fn close(&mut self) {
        if let Some(session) = self.session.take() {
            disconnect(&session, &self.address).await;
            tracing::info!("Closed SSH session to {}", self.address);
        }
    }

    fn is_closed(&self) -> bool {
        self.session.is_none()
    }
}

/// Open a new channel and start `command` on it
async fn open_exec(
    session: &Handle<ClientHandler>,
    command: &str,
) -> Result<Channel<Msg>, BridgeError> {
    let channel = session
        .channel_open_session()
        .await
        .map_err(|e| BridgeError::Channel(format!("failed to open channel: {}", e)))?;

    channel
        .exec(true, command)
        .await
        .map_err(|e| BridgeError::Channel(format!("failed to start command: {}", e)))?;

    Ok(channel)
}

/// Collect stdout and stderr until the server closes the channel
async fn collect(
    channel: &mut Channel<Msg>,
    output: &mut CapturedOutput,
) -> Result<(), BridgeError> {
    let mut exit_status = None;

    while let Some(message) = channel.wait().await {
        match message {
            ChannelMsg::Data { ref data } => output.push(data),
            ChannelMsg::ExtendedData { ref data, ext } if ext == SSH_EXTENDED_DATA_STDERR => {
                output.push(data)
            }
            ChannelMsg::ExitStatus { exit_status: code } => exit_status = Some(code),
            ChannelMsg::Failure => {
                return Err(BridgeError::Channel(
                    "the server refused to run the command".to_string(),
                ));
            }
            ChannelMsg::Close => break,
            _ => {}
        }
    }

    // A non-zero exit is still a completed command; its stderr is the output
    tracing::debug!(exit_status = ?exit_status, "Command finished");
    Ok(())
}

/// Close a channel whose command did not finish on its own
async fn close_channel(channel: &Channel<Msg>, address: &str) {
    match tokio::time::timeout(CHANNEL_CLOSE_TIMEOUT, channel.close()).await {
        Ok(Ok(())) => tracing::debug!("Closed channel {:?} on {}", channel.id(), address),
        Ok(Err(e)) => tracing::debug!("Closing channel on {} reported: {}", address, e),
        Err(_) => tracing::warn!("Closing channel on {} timed out", address),
    }
}
