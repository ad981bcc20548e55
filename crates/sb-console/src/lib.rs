//! sb-console: Terminal front end for shellbot
//!
//! Plays the part of a chat front end: turns typed lines into operator
//! events, sends them over the gateway and prints the replies.

pub mod client;
pub mod input;
pub mod output;
