//! Replies collected while processing one operator event

use sb_core::gateway::{Button, Reply};

/// The output operations a conversational front end offers
///
/// Replies are buffered in order and handed to the front end once the
/// event has been processed.
#[derive(Debug, Default)]
pub struct Outbox {
    replies: Vec<Reply>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send a plain message
    pub fn reply(&mut self, text: impl Into<String>) {
        self.present_options(text, vec![]);
    }

    /// Send a message with buttons
    pub fn present_options(&mut self, text: impl Into<String>, buttons: Vec<Button>) {
        self.replies.push(Reply::Message {
            text: text.into(),
            buttons,
        });
    }

    /// Replace the text of the last message the operator saw
    pub fn edit_last_reply(&mut self, text: impl Into<String>) {
        self.replies.push(Reply::Edit { text: text.into() });
    }

    pub fn into_replies(self) -> Vec<Reply> {
        self.replies
    }
}
