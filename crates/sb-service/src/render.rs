//! Operator-facing texts and menus

use sb_core::gateway::Button;
use sb_core::{BridgeError, ConfigOption, Configuration};

use crate::machine::{payload, SessionState};
use crate::outbox::Outbox;

pub const GREETING: &str = "This bot connects over SSH (Secure Shell) to Linux machines using the \
usual SSH configuration parameters: hostname (as an IP address), port, username and password.";

pub const EMPTY_CONFIGURATION: &str =
    "Set up the parameters; the connect button becomes available once all of them are set:";

pub const RESET_NOTICE: &str = "The connection parameters have been reset";

pub const CONNECTING: &str = "Waiting for the SSH connection to be confirmed...";

pub const COMMAND_MODE_HELP: &str = "You can now run these commands on the remote server:\n\
/whoami to show the name of the logged in user\n\
/uptime to see how long the system has been running\n\n\
Or switch to interactive mode and type shell commands yourself:\n\
/interactive to toggle interactive mode (while it is on, the commands above are unavailable)\n\n\
/disconnect to close the SSH session\n\n\
What you can do on the server depends on your access level.";

pub const INTERACTIVE_ON: &str = "Interactive mode enabled";

pub const INTERACTIVE_OFF: &str = "Interactive mode disabled";

pub const INTERACTIVE_USAGE: &str = "IMPORTANT\n\n\
1. Every shell command runs from the user's home directory.\n\n\
2. If a command returns nothing, the reply says so.\n\n\
3. Several commands can be joined on one line, for example:\n\
cd dir1; ls  lists the contents of ../dir1/\n\
mkdir dir2; cd dir2; touch file; ls -a  replies with:\n\
.\n\
..\n\
file";

pub const EMPTY_OUTPUT: &str = "stdout/stderr are empty: your command ran but returned nothing";

pub const DISCONNECTED: &str = "SSH session closed. Use /connect to set up a new connection.";

pub const NOT_CONNECTED: &str = "There is no open SSH session. Use /connect to set one up.";

pub const COMMAND_UNAVAILABLE: &str = "This command is currently unavailable";

pub const UNDEFINED_REQUEST: &str = "Undefined request";

pub const IDLE_HELP: &str = "Send /start to begin.";

pub const CONFIGURING_HELP: &str =
    "Use the buttons to set each parameter, then press Connect. /start clears everything.";

/// Show the current configuration and the configuration menu
pub fn configuration_menu(configuration: &Configuration, outbox: &mut Outbox) {
    let text = if configuration.is_empty() {
        EMPTY_CONFIGURATION.to_string()
    } else {
        configuration
            .iter()
            .map(|(option, value)| format!("{}: {}", title(option), display_value(option, value)))
            .collect::<Vec<_>>()
            .join("\n")
    };
    outbox.present_options(text, configuration_buttons(configuration));
}

/// One button per option, Reset when anything is set, then Connect
pub fn configuration_buttons(configuration: &Configuration) -> Vec<Button> {
    let mut buttons: Vec<Button> = ConfigOption::ALL
        .into_iter()
        .map(|option| {
            let label = match configuration.get(option) {
                Some(value) if !value.is_empty() => format!("Change {}", option),
                _ => format!("➕ Add {}", option),
            };
            Button::new(label, format!("{}{}", option, payload::OPTION_SUFFIX))
        })
        .collect();

    if configuration.any_set() {
        buttons.push(Button::new("Reset", payload::RESET));
    }

    let marker = if configuration.is_complete() {
        "👨🏻‍💻"
    } else {
        "🚫"
    };
    buttons.push(Button::new(format!("{} Connect", marker), payload::CONNECT));
    buttons
}

pub fn value_prompt(option: ConfigOption) -> String {
    format!("Enter the {}", option)
}

pub fn incomplete(missing: &[ConfigOption]) -> String {
    let names: Vec<&str> = missing.iter().map(ConfigOption::as_str).collect();
    format!(
        "The connection parameters are incomplete. Still missing: {}",
        names.join(", ")
    )
}

pub fn connection_failed(error: &BridgeError) -> String {
    format!(
        "Sorry, the connection is not possible.\n\n\
         Error:\n{}\n\n\
         Try changing your connection settings (SSH configuration parameters):\n/connect",
        error
    )
}

pub fn command_failed(reason: &str) -> String {
    format!("Command failed: {}", reason)
}

pub fn undefined(command: bool) -> &'static str {
    if command {
        COMMAND_UNAVAILABLE
    } else {
        UNDEFINED_REQUEST
    }
}

/// Help matching what the operator can do right now
pub fn help(state: SessionState) -> String {
    match state {
        SessionState::Idle => IDLE_HELP.to_string(),
        SessionState::Configuring | SessionState::Connecting => CONFIGURING_HELP.to_string(),
        SessionState::AwaitingValue(option) => value_prompt(option),
        SessionState::CommandMode => COMMAND_MODE_HELP.to_string(),
        SessionState::InteractiveMode => INTERACTIVE_USAGE.to_string(),
    }
}

fn title(option: ConfigOption) -> String {
    let name = option.as_str();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn display_value(option: ConfigOption, value: &str) -> String {
    match option {
        ConfigOption::Password => "•".repeat(value.chars().count().clamp(1, 8)),
        _ => value.to_string(),
    }
}
