//! Per-operator sessions

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use sb_core::traits::RemoteShell;
use sb_core::{Configuration, OperatorId};

use crate::machine::SessionState;

/// State, configuration and remote handle of one operator
pub struct OperatorSession<S> {
    /// Current state machine state
    pub state: SessionState,
    /// Connection parameters entered so far
    pub configuration: Configuration,
    /// Open remote shell; only present while connected
    pub remote: Option<S>,
}

impl<S: RemoteShell> OperatorSession<S> {
    /// Fresh session: idle, nothing configured, not connected
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            configuration: Configuration::new(),
            remote: None,
        }
    }

    /// Close the remote shell if one is open
    pub async fn close_remote(&mut self) {
        if let Some(mut shell) = self.remote.take() {
            shell.close().await;
        }
    }

    /// Close the remote shell and return to idle
    pub async fn shut_down(&mut self) {
        self.close_remote().await;
        self.state = SessionState::Idle;
    }
}

impl<S: RemoteShell> Default for OperatorSession<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to one operator's session
///
/// The mutex is held for the whole processing of an event, which
/// serializes events of the same operator.
pub type SessionHandle<S> = Arc<Mutex<OperatorSession<S>>>;

/// All operator sessions, created on first contact
pub struct SessionStore<S> {
    sessions: DashMap<OperatorId, SessionHandle<S>>,
}

impl<S: RemoteShell> SessionStore<S> {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Get the session of an operator, creating it if needed
    pub fn get_or_create(&self, operator: &OperatorId) -> SessionHandle<S> {
        let entry = self.sessions.entry(operator.clone()).or_insert_with(|| {
            tracing::debug!("Creating session for operator {}", operator);
            Arc::new(Mutex::new(OperatorSession::new()))
        });
        Arc::clone(entry.value())
    }

    /// Get an existing session
    pub fn get(&self, operator: &OperatorId) -> Option<SessionHandle<S>> {
        self.sessions.get(operator).map(|r| Arc::clone(r.value()))
    }

    /// Number of known operators
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Close every remote handle and reset every session to idle
    pub async fn shut_down_all(&self) {
        // Collect first so no map shard stays locked across the awaits
        let handles: Vec<(OperatorId, SessionHandle<S>)> = self
            .sessions
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();

        for (operator, handle) in handles {
            let mut session = handle.lock().await;
            if session.remote.is_some() {
                tracing::info!("Closing remote session of operator {}", operator);
            }
            session.shut_down().await;
        }
    }
}

impl<S: RemoteShell> Default for SessionStore<S> {
    fn default() -> Self {
        Self::new()
    }
}
