//! Core trait definitions

mod bridge;

pub use bridge::{RemoteConnector, RemoteShell};
