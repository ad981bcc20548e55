//! Remote command bridge traits
//!
//! The session state machine only ever talks to a remote host through these
//! two traits: a connector that turns four connection parameters into an open
//! shell, and the shell itself, which runs one command line at a time.

use async_trait::async_trait;

use crate::error::BridgeError;
use crate::types::{CommandResult, ConnectionParams};

/// Opens remote shell sessions
#[async_trait]
pub trait RemoteConnector: Send + Sync {
    /// The shell handle produced by a successful connect
    type Shell: RemoteShell;

    /// Open exactly one remote session
    ///
    /// On error nothing is left open: a partially established transport is
    /// torn down before the error is returned.
    async fn connect(&self, params: &ConnectionParams) -> Result<Self::Shell, BridgeError>;
}

/// An open remote shell session, exclusively owned by one operator session
#[async_trait]
pub trait RemoteShell: Send {
    /// Run `command` verbatim as a single shell invocation
    ///
    /// Combined stdout/stderr is returned as [`CommandResult::Output`],
    /// whitespace-only output as [`CommandResult::EmptyOutput`], and any
    /// transport error or timeout as [`CommandResult::Failure`].
    async fn run(&mut self, command: &str) -> CommandResult;

    /// Release the session. Calling it again is a no-op.
    async fn close(&mut self);

    /// Whether `close` has already run
    fn is_closed(&self) -> bool;
}
