//! Front-end gateway server
//!
//! Listens on localhost TCP for newline-delimited JSON requests from
//! conversational front ends. Requests on one connection are processed
//! strictly in order; each connection runs in its own task.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::FutureExt;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use sb_core::gateway::{GatewayRequest, GatewayResponse};
use sb_core::traits::RemoteConnector;

use crate::dispatcher::Dispatcher;

/// Gateway server for front-end adapters
///
/// Listens on localhost (127.0.0.1) only: the gateway trusts the operator
/// identity the front end reports.
pub struct GatewayServer<C: RemoteConnector> {
    /// Address to bind (127.0.0.1:port)
    pub address: String,
    /// Event dispatcher
    dispatcher: Arc<Dispatcher<C>>,
    /// Cancellation token for shutdown
    shutdown_token: Option<CancellationToken>,
}

impl<C: RemoteConnector + 'static> GatewayServer<C> {
    /// Create a new gateway server
    pub fn new(address: String, dispatcher: Arc<Dispatcher<C>>) -> Self {
        Self {
            address,
            dispatcher,
            shutdown_token: None,
        }
    }

    /// Set the shutdown token (call before run)
    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown_token = Some(token);
        self
    }

    /// Start the gateway; returns once the shutdown token is cancelled
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.address)
            .await
            .with_context(|| format!("Failed to bind gateway to {}", self.address))?;

        tracing::info!("Gateway listening on {}", self.address);

        let shutdown = self.shutdown_token.clone().unwrap_or_default();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Gateway stopping");
                    return Ok(());
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer_addr)) => {
                        // Only accept connections from localhost
                        if !peer_addr.ip().is_loopback() {
                            tracing::warn!("Rejected non-localhost connection from {}", peer_addr);
                            continue;
                        }

                        tracing::debug!("Front end connected from {}", peer_addr);
                        let dispatcher = Arc::clone(&self.dispatcher);
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            if let Err(e) = handle_client(stream, dispatcher, shutdown).await {
                                tracing::warn!("Gateway client error: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!("Failed to accept gateway connection: {}", e);
                    }
                }
            }
        }
    }
}

async fn handle_client<C: RemoteConnector>(
    stream: TcpStream,
    dispatcher: Arc<Dispatcher<C>>,
    shutdown: CancellationToken,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let read = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            read = reader.read_line(&mut line) => read?,
        };
        if read == 0 {
            break; // EOF
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        // A line that arrived together with shutdown is never dispatched
        if shutdown.is_cancelled() {
            break;
        }

        let response = match serde_json::from_str::<GatewayRequest>(trimmed) {
            Ok(request) => handle_request(request, &dispatcher, &shutdown).await,
            Err(e) => GatewayResponse::Error {
                message: format!("Invalid request: {}", e),
            },
        };

        let mut response_json = serde_json::to_string(&response)?;
        response_json.push('\n');
        writer.write_all(response_json.as_bytes()).await?;
    }

    Ok(())
}

async fn handle_request<C: RemoteConnector>(
    request: GatewayRequest,
    dispatcher: &Dispatcher<C>,
    shutdown: &CancellationToken,
) -> GatewayResponse {
    match request {
        GatewayRequest::Event { operator, event } => {
            // A panic while handling one event must not take the service down
            let handled = AssertUnwindSafe(dispatcher.handle_event(&operator, event))
                .catch_unwind()
                .await;

            match handled {
                Ok(Some(replies)) => GatewayResponse::Replies { replies },
                Ok(None) => GatewayResponse::Ignored,
                Err(panic) => {
                    let reason = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    tracing::error!(
                        "Dropped event from operator {} after internal error: {}",
                        operator,
                        reason
                    );
                    GatewayResponse::Error {
                        message: "Internal error, the event was dropped".to_string(),
                    }
                }
            }
        }

        GatewayRequest::Ping => GatewayResponse::Pong,

        GatewayRequest::Shutdown => {
            tracing::info!("Shutdown requested via gateway");
            shutdown.cancel();
            GatewayResponse::Ok
        }
    }
}
