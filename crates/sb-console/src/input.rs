//! Typed line to operator event
//!
//! - `/start` restarts the conversation, the other service commands
//!   (`/whoami`, `/interactive`, ...) are sent as commands
//! - `@N` presses the N-th button of the last menu, `@payload` a raw payload
//! - `/quit` leaves the console
//! - everything else is sent as text

use sb_core::gateway::{Button, OperatorEvent, COMMANDS};

/// What a typed line asks the console to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    /// Send an event to the service
    Event(OperatorEvent),
    /// Leave the console
    Quit,
    /// Blank line
    Nothing,
}

/// Parse one line typed by the operator
///
/// `buttons` are the buttons of the last presented menu, numbered from 1.
pub fn parse_line(line: &str, buttons: &[Button]) -> Result<ConsoleInput, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(ConsoleInput::Nothing);
    }

    if let Some(name) = line.trim().strip_prefix('/') {
        match name {
            "quit" => return Ok(ConsoleInput::Quit),
            "start" => return Ok(ConsoleInput::Event(OperatorEvent::Start)),
            _ if COMMANDS.contains(&name) => {
                return Ok(ConsoleInput::Event(OperatorEvent::Command {
                    name: name.to_string(),
                }))
            }
            // Shell lines such as `/bin/ls -la` go out as typed
            _ => {}
        }
    }

    if let Some(target) = line.strip_prefix('@') {
        let target = target.trim();
        let payload = match target.parse::<usize>() {
            Ok(index) => buttons
                .get(index.wrapping_sub(1))
                .map(|button| button.payload.clone())
                .ok_or_else(|| format!("No button {} in the last menu", index))?,
            Err(_) if target.is_empty() => return Err("Missing button".to_string()),
            Err(_) => target.to_string(),
        };
        return Ok(ConsoleInput::Event(OperatorEvent::Button { payload }));
    }

    Ok(ConsoleInput::Event(OperatorEvent::Text {
        text: line.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> Vec<Button> {
        vec![
            Button::new("➕ Add hostname", "hostname_option"),
            Button::new("🚫 Connect", "connect"),
        ]
    }

    fn event(input: Result<ConsoleInput, String>) -> OperatorEvent {
        match input {
            Ok(ConsoleInput::Event(event)) => event,
            other => panic!("expected an event, got {:?}", other),
        }
    }

    #[test]
    fn test_commands() {
        assert_eq!(event(parse_line("/start\n", &[])), OperatorEvent::Start);
        assert_eq!(
            event(parse_line("/whoami", &[])),
            OperatorEvent::Command {
                name: "whoami".to_string()
            }
        );
        assert_eq!(parse_line("/quit", &[]), Ok(ConsoleInput::Quit));
    }

    #[test]
    fn test_slash_shell_lines_are_text() {
        assert_eq!(
            event(parse_line("/bin/ls -la /etc", &[])),
            OperatorEvent::Text {
                text: "/bin/ls -la /etc".to_string()
            }
        );
        assert_eq!(
            event(parse_line("/whoami now", &[])),
            OperatorEvent::Text {
                text: "/whoami now".to_string()
            }
        );
        assert_eq!(
            event(parse_line(" /interactive ", &[])),
            OperatorEvent::Command {
                name: "interactive".to_string()
            }
        );
    }

    #[test]
    fn test_buttons_by_index_and_payload() {
        assert_eq!(
            event(parse_line("@2", &menu())),
            OperatorEvent::Button {
                payload: "connect".to_string()
            }
        );
        assert_eq!(
            event(parse_line("@reset", &menu())),
            OperatorEvent::Button {
                payload: "reset".to_string()
            }
        );
        assert!(parse_line("@3", &menu()).is_err());
        assert!(parse_line("@0", &menu()).is_err());
        assert!(parse_line("@", &menu()).is_err());
    }

    #[test]
    fn test_text_kept_verbatim() {
        assert_eq!(
            event(parse_line("  mkdir d; cd d; ls -a\r\n", &[])),
            OperatorEvent::Text {
                text: "  mkdir d; cd d; ls -a".to_string()
            }
        );
        assert_eq!(parse_line("   \n", &[]), Ok(ConsoleInput::Nothing));
    }
}
