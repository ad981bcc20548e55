//! Gateway protocol between conversational front ends and the service
//!
//! Newline-delimited JSON over TCP: the front end writes one request per
//! line and reads exactly one response line back.

use serde::{Deserialize, Serialize};

use crate::types::OperatorId;

/// Request from a front end to the service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayRequest {
    /// Deliver an operator event
    Event {
        operator: OperatorId,
        event: OperatorEvent,
    },

    /// Ping (for keepalive)
    Ping,

    /// Shut the service down
    Shutdown,
}

/// Event produced by an operator in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperatorEvent {
    /// Conversation (re)started
    Start,
    /// A menu button was pressed; the payload is opaque to the front end
    Button { payload: String },
    /// Free text message
    Text { text: String },
    /// Named command invocation (`/whoami` arrives as `whoami`)
    Command { name: String },
}

/// Command names the service understands, without the leading `/`
///
/// Front ends send these as `command` events; any other line is text.
pub const COMMANDS: [&str; 7] = [
    "start",
    "connect",
    "whoami",
    "uptime",
    "interactive",
    "disconnect",
    "help",
];

/// Response from the service to a front end
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayResponse {
    /// Replies to show the operator, in order
    Replies { replies: Vec<Reply> },

    /// Event dropped (operator not on the allow-list)
    Ignored,

    /// Generic success
    Ok,

    /// Error response
    Error { message: String },

    /// Pong response
    Pong,
}

/// One output operation towards the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    /// Send a new message, optionally presenting buttons
    Message {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        buttons: Vec<Button>,
    },
    /// Replace the text of the last message sent
    Edit { text: String },
}

impl Reply {
    /// Text carried by the reply
    pub fn text(&self) -> &str {
        match self {
            Reply::Message { text, .. } | Reply::Edit { text } => text,
        }
    }

    /// Buttons presented with the reply
    pub fn buttons(&self) -> &[Button] {
        match self {
            Reply::Message { buttons, .. } => buttons,
            Reply::Edit { .. } => &[],
        }
    }
}

/// A menu button: display label plus the payload sent back when pressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

impl Button {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}
