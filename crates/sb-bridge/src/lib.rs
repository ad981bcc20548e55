//! sb-bridge: Remote command bridge for shellbot
//!
//! Opens password-authenticated SSH sessions with `russh` and runs one
//! command line per exec channel, returning the combined output as a
//! [`sb_core::CommandResult`].

mod connector;
mod output;
mod shell;

pub use connector::SshConnector;
pub use output::CapturedOutput;
pub use shell::SshShell;
