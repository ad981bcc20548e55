//! Session state machine
//!
//! Operator events are parsed into an [`Input`], and [`transition`] maps
//! `(state, input)` to the next state plus the [`Action`] the dispatcher has
//! to perform. The function is pure; all I/O happens in the dispatcher.

use std::fmt;

use sb_core::gateway::OperatorEvent;
use sb_core::ConfigOption;

/// Per-operator session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No conversation yet, or disconnected
    #[default]
    Idle,
    /// Showing the configuration menu
    Configuring,
    /// Waiting for the value of one option
    AwaitingValue(ConfigOption),
    /// A connect attempt is in flight
    Connecting,
    /// Connected, predefined commands available
    CommandMode,
    /// Connected, every text message is a shell command
    InteractiveMode,
}

impl SessionState {
    /// Whether a remote handle may be held in this state
    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::CommandMode | SessionState::InteractiveMode)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Configuring => write!(f, "configuring"),
            SessionState::AwaitingValue(option) => write!(f, "awaiting_value:{}", option),
            SessionState::Connecting => write!(f, "connecting"),
            SessionState::CommandMode => write!(f, "command_mode"),
            SessionState::InteractiveMode => write!(f, "interactive_mode"),
        }
    }
}

/// Remote commands available from command mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredefinedCommand {
    Whoami,
    Uptime,
}

impl PredefinedCommand {
    /// Shell command line sent to the bridge
    pub fn command_line(&self) -> &'static str {
        match self {
            PredefinedCommand::Whoami => "whoami",
            PredefinedCommand::Uptime => "uptime",
        }
    }
}

/// Operator event interpreted for routing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Start,
    Configure,
    PickOption(ConfigOption),
    Reset,
    Connect,
    Predefined(PredefinedCommand),
    ToggleInteractive,
    Disconnect,
    Help,
    Text(String),
    Unrecognized { command: bool },
}

/// Button payloads understood by the service
pub mod payload {
    pub const CONFIGURE: &str = "configure";
    pub const RESET: &str = "reset";
    pub const CONNECT: &str = "connect";
    pub const OPTION_SUFFIX: &str = "_option";
}

impl Input {
    /// Interpret a raw front-end event
    pub fn parse(event: OperatorEvent) -> Self {
        match event {
            OperatorEvent::Start => Input::Start,
            OperatorEvent::Text { text } => Input::Text(text),
            OperatorEvent::Command { name } => Self::parse_command(&name),
            OperatorEvent::Button { payload } => Self::parse_payload(&payload),
        }
    }

    fn parse_command(name: &str) -> Self {
        match name.trim().trim_start_matches('/') {
            "start" => Input::Start,
            "connect" => Input::Configure,
            "whoami" => Input::Predefined(PredefinedCommand::Whoami),
            "uptime" => Input::Predefined(PredefinedCommand::Uptime),
            "interactive" => Input::ToggleInteractive,
            "disconnect" => Input::Disconnect,
            "help" => Input::Help,
            _ => Input::Unrecognized { command: true },
        }
    }

    fn parse_payload(data: &str) -> Self {
        match data {
            payload::CONFIGURE => Input::Configure,
            payload::RESET => Input::Reset,
            payload::CONNECT => Input::Connect,
            other => other
                .strip_suffix(payload::OPTION_SUFFIX)
                .and_then(|name| name.parse::<ConfigOption>().ok())
                .map(Input::PickOption)
                .unwrap_or(Input::Unrecognized { command: false }),
        }
    }
}

/// Side effect requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Close any remote session, clear the configuration, greet and show the menu
    Greet,
    /// Close any remote session, clear the configuration and show the menu
    ResetConfiguration,
    /// Close any remote session and show the menu
    ShowConfiguration,
    /// Ask for the value of an option
    PromptValue(ConfigOption),
    /// Store a value and show the menu again
    StoreValue(ConfigOption, String),
    /// Open the remote session
    Connect,
    /// Connect pressed before all options were set
    ReportIncomplete,
    /// Run a command line on the remote session
    Run(String),
    EnterInteractive,
    LeaveInteractive,
    /// Close the remote session
    Disconnect,
    Help,
    /// Event not valid in the current state
    Undefined { command: bool },
}

/// Result of applying an input to a state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State after the action succeeds
    pub next: SessionState,
    pub action: Action,
}

impl Transition {
    fn to(next: SessionState, action: Action) -> Self {
        Self { next, action }
    }
}

/// The transition table
///
/// For [`Action::Connect`], `next` is the state on success; a failed connect
/// leaves the session in [`SessionState::Configuring`].
pub fn transition(state: SessionState, input: Input, configuration_complete: bool) -> Transition {
    use SessionState::*;

    match (state, input) {
        (_, Input::Start) => Transition::to(Configuring, Action::Greet),
        (_, Input::Reset) => Transition::to(Configuring, Action::ResetConfiguration),
        (_, Input::Configure) => Transition::to(Configuring, Action::ShowConfiguration),
        (_, Input::Help) => Transition::to(state, Action::Help),

        (Configuring, Input::PickOption(option)) => {
            Transition::to(AwaitingValue(option), Action::PromptValue(option))
        }
        (AwaitingValue(option), Input::Text(text)) => {
            Transition::to(Configuring, Action::StoreValue(option, text))
        }
        (Configuring, Input::Connect) if configuration_complete => {
            Transition::to(CommandMode, Action::Connect)
        }
        (Configuring, Input::Connect) => Transition::to(Configuring, Action::ReportIncomplete),

        (CommandMode, Input::Predefined(command)) => Transition::to(
            CommandMode,
            Action::Run(command.command_line().to_string()),
        ),
        (CommandMode, Input::ToggleInteractive) => {
            Transition::to(InteractiveMode, Action::EnterInteractive)
        }
        (InteractiveMode, Input::ToggleInteractive) => {
            Transition::to(CommandMode, Action::LeaveInteractive)
        }
        (InteractiveMode, Input::Text(text)) => Transition::to(InteractiveMode, Action::Run(text)),
        (CommandMode | InteractiveMode, Input::Disconnect) => {
            Transition::to(Idle, Action::Disconnect)
        }

        (_, Input::Text(text)) => Transition::to(
            state,
            Action::Undefined {
                command: text.starts_with('/'),
            },
        ),
        (_, Input::Predefined(_) | Input::ToggleInteractive | Input::Disconnect) => {
            Transition::to(state, Action::Undefined { command: true })
        }
        (_, Input::PickOption(_) | Input::Connect) => {
            Transition::to(state, Action::Undefined { command: false })
        }
        (_, Input::Unrecognized { command }) => Transition::to(state, Action::Undefined { command }),
    }
}
