//! Gateway client for talking to the shellbot service
//!
//! Uses TCP on localhost, one JSON line per request and per response.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use sb_core::gateway::{GatewayRequest, GatewayResponse, OperatorEvent};
use sb_core::OperatorId;

/// Client for the service gateway
pub struct GatewayClient {
    address: String,
    stream: Option<(BufReader<OwnedReadHalf>, OwnedWriteHalf)>,
}

impl GatewayClient {
    /// Create a new client for `address`
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            stream: None,
        }
    }

    /// Get the address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Connect to the service if not already connected
    pub async fn connect(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        tracing::debug!("Connecting to gateway at {}", self.address);

        let stream = TcpStream::connect(&self.address).await.with_context(|| {
            format!(
                "Failed to connect to the service at {}. Is it running?",
                self.address
            )
        })?;
        let (reader, writer) = stream.into_split();
        self.stream = Some((BufReader::new(reader), writer));
        Ok(())
    }

    /// Check if the service is running
    pub async fn ping(&mut self) -> Result<bool> {
        self.connect().await?;

        match self.send_request(GatewayRequest::Ping).await {
            Ok(GatewayResponse::Pong) => Ok(true),
            _ => Ok(false),
        }
    }

    /// Deliver one operator event
    pub async fn send_event(
        &mut self,
        operator: &OperatorId,
        event: OperatorEvent,
    ) -> Result<GatewayResponse> {
        self.connect().await?;
        self.send_request(GatewayRequest::Event {
            operator: operator.clone(),
            event,
        })
        .await
    }

    /// Ask the service to shut down
    pub async fn shutdown(&mut self) -> Result<()> {
        self.connect().await?;

        match self.send_request(GatewayRequest::Shutdown).await? {
            GatewayResponse::Ok => Ok(()),
            GatewayResponse::Error { message } => anyhow::bail!("{}", message),
            other => anyhow::bail!("Unexpected response: {:?}", other),
        }
    }

    async fn send_request(&mut self, request: GatewayRequest) -> Result<GatewayResponse> {
        let (reader, writer) = self
            .stream
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("Not connected"))?;

        // Send request as JSON line
        let mut request_json = serde_json::to_string(&request)?;
        request_json.push('\n');
        writer.write_all(request_json.as_bytes()).await?;

        // Read response line
        let mut response_line = String::new();
        if reader.read_line(&mut response_line).await? == 0 {
            self.stream = None;
            anyhow::bail!("The service closed the connection");
        }

        let response: GatewayResponse = serde_json::from_str(&response_line)
            .with_context(|| format!("Invalid response: {}", response_line.trim()))?;
        Ok(response)
    }
}
