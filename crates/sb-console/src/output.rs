//! Printing replies to the terminal

use sb_core::gateway::{Button, Reply};

/// Format the buttons of a menu, numbered for `@N`
pub fn format_buttons(buttons: &[Button]) -> String {
    buttons
        .iter()
        .enumerate()
        .map(|(i, button)| format!("  [{}] {}", i + 1, button.label))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print the replies of one event in order
pub fn print_replies(replies: &[Reply]) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    for reply in replies {
        let _ = match reply {
            Reply::Message { text, .. } => {
                crossterm::execute!(stdout, Print(text), Print("\n"))
            }
            Reply::Edit { text } => crossterm::execute!(
                stdout,
                SetForegroundColor(Color::DarkGrey),
                Print("(edited) "),
                ResetColor,
                Print(text),
                Print("\n")
            ),
        };

        if !reply.buttons().is_empty() {
            let _ = crossterm::execute!(
                stdout,
                SetForegroundColor(Color::Cyan),
                Print(format_buttons(reply.buttons())),
                ResetColor,
                Print("\n")
            );
        }
    }
}

/// Print an error message in red with an X prefix
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow with a warning symbol prefix
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan with an info symbol prefix
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}
