//! Event dispatcher
//!
//! Applies the transition table to an operator's session and performs the
//! requested side effect: configuration edits, bridge connect/run, and the
//! replies that go back to the front end.

use sb_core::gateway::{OperatorEvent, Reply};
use sb_core::traits::{RemoteConnector, RemoteShell};
use sb_core::{CommandResult, OperatorId, SessionError};

use crate::auth::AllowList;
use crate::machine::{transition, Action, Input, SessionState, Transition};
use crate::outbox::Outbox;
use crate::render;
use crate::session::{OperatorSession, SessionStore};

/// Routes operator events through the state machine and the bridge
pub struct Dispatcher<C: RemoteConnector> {
    /// Opens remote sessions
    connector: C,
    /// Operators allowed to use the service
    allow_list: AllowList,
    /// Sessions indexed by operator
    sessions: SessionStore<C::Shell>,
}

impl<C: RemoteConnector> Dispatcher<C> {
    /// Create a new dispatcher
    pub fn new(connector: C, allow_list: AllowList) -> Self {
        Self {
            connector,
            allow_list,
            sessions: SessionStore::new(),
        }
    }

    /// Get the session store
    pub fn sessions(&self) -> &SessionStore<C::Shell> {
        &self.sessions
    }

    /// Process one operator event
    ///
    /// Returns `None` when the operator is not authorized; no session is
    /// created in that case.
    pub async fn handle_event(
        &self,
        operator: &OperatorId,
        event: OperatorEvent,
    ) -> Option<Vec<Reply>> {
        if !self.allow_list.is_authorized(operator) {
            tracing::warn!("Dropping event from unauthorized operator {}", operator);
            return None;
        }

        let handle = self.sessions.get_or_create(operator);
        let mut session = handle.lock().await;

        let Transition { next, action } = transition(
            session.state,
            Input::parse(event),
            session.configuration.is_complete(),
        );
        tracing::debug!(
            operator = %operator,
            from = %session.state,
            to = %next,
            "Applying {:?}",
            ActionName(&action)
        );

        let mut outbox = Outbox::new();
        let reached = self.apply(&mut session, next, action, &mut outbox).await;
        session.state = reached;

        Some(outbox.into_replies())
    }

    /// Close every remote session and reset all operators to idle
    pub async fn shutdown(&self) {
        tracing::info!("Closing {} operator sessions", self.sessions.len());
        self.sessions.shut_down_all().await;
    }

    /// Perform `action` and return the state the session ends up in
    async fn apply(
        &self,
        session: &mut OperatorSession<C::Shell>,
        next: SessionState,
        action: Action,
        outbox: &mut Outbox,
    ) -> SessionState {
        match action {
            Action::Greet => {
                session.close_remote().await;
                session.configuration.clear();
                outbox.reply(render::GREETING);
                render::configuration_menu(&session.configuration, outbox);
            }
            Action::ResetConfiguration => {
                session.close_remote().await;
                session.configuration.clear();
                outbox.edit_last_reply(render::RESET_NOTICE);
                render::configuration_menu(&session.configuration, outbox);
            }
            Action::ShowConfiguration => {
                session.close_remote().await;
                render::configuration_menu(&session.configuration, outbox);
            }
            Action::PromptValue(option) => {
                outbox.edit_last_reply(render::value_prompt(option));
            }
            Action::StoreValue(option, value) => {
                session.configuration.set(option, value);
                render::configuration_menu(&session.configuration, outbox);
            }
            Action::Connect => return self.connect(session, next, outbox).await,
            Action::ReportIncomplete => {
                let missing = session.configuration.missing();
                let error = SessionError::ConfigurationIncomplete {
                    missing: missing.clone(),
                };
                tracing::debug!("{}", error);
                outbox.reply(render::incomplete(&missing));
            }
            Action::Run(command) => self.run(session, &command, outbox).await,
            Action::EnterInteractive => {
                outbox.reply(render::INTERACTIVE_ON);
                outbox.reply(render::INTERACTIVE_USAGE);
            }
            Action::LeaveInteractive => {
                outbox.reply(render::INTERACTIVE_OFF);
                outbox.reply(render::COMMAND_MODE_HELP);
            }
            Action::Disconnect => {
                session.close_remote().await;
                outbox.reply(render::DISCONNECTED);
            }
            Action::Help => outbox.reply(render::help(session.state)),
            Action::Undefined { command } => {
                tracing::debug!("{} in {}", SessionError::UndefinedRequest, session.state);
                outbox.reply(render::undefined(command));
            }
        }
        next
    }

    async fn connect(
        &self,
        session: &mut OperatorSession<C::Shell>,
        next: SessionState,
        outbox: &mut Outbox,
    ) -> SessionState {
        let Some(params) = session.configuration.to_params() else {
            outbox.reply(render::incomplete(&session.configuration.missing()));
            return SessionState::Configuring;
        };

        // Never hold two handles at once
        session.close_remote().await;
        // Connecting lives only for this call; the session keeps its state
        // until the outcome is known
        tracing::debug!("{} to {}:{}", SessionState::Connecting, params.hostname, params.port);
        outbox.edit_last_reply(render::CONNECTING);

        match self.connector.connect(&params).await {
            Ok(shell) => {
                session.remote = Some(shell);
                outbox.reply(render::COMMAND_MODE_HELP);
                next
            }
            Err(e) => {
                tracing::info!("Connect to {}:{} failed: {}", params.hostname, params.port, e);
                outbox.reply(render::connection_failed(&e));
                SessionState::Configuring
            }
        }
    }

    async fn run(&self, session: &mut OperatorSession<C::Shell>, command: &str, outbox: &mut Outbox) {
        let state = session.state;
        let Some(shell) = session.remote.as_mut().filter(|shell| !shell.is_closed()) else {
            tracing::error!("Command requested in {}: {}", state, SessionError::NotConnected);
            outbox.reply(render::NOT_CONNECTED);
            return;
        };

        match shell.run(command).await {
            CommandResult::Output(text) => outbox.reply(text),
            CommandResult::EmptyOutput => outbox.reply(render::EMPTY_OUTPUT),
            CommandResult::Failure(reason) => outbox.reply(render::command_failed(&reason)),
        }
    }
}

/// Logs the action kind without values the operator typed
struct ActionName<'a>(&'a Action);

impl std::fmt::Debug for ActionName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.0 {
            Action::Greet => "Greet",
            Action::ResetConfiguration => "ResetConfiguration",
            Action::ShowConfiguration => "ShowConfiguration",
            Action::PromptValue(_) => "PromptValue",
            Action::StoreValue(..) => "StoreValue",
            Action::Connect => "Connect",
            Action::ReportIncomplete => "ReportIncomplete",
            Action::Run(_) => "Run",
            Action::EnterInteractive => "EnterInteractive",
            Action::LeaveInteractive => "LeaveInteractive",
            Action::Disconnect => "Disconnect",
            Action::Help => "Help",
            Action::Undefined { .. } => "Undefined",
        };
        f.write_str(name)
    }
}
