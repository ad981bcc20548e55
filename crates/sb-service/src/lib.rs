//! sb-service: Operator session service for shellbot
//!
//! Owns one session per operator, runs every operator event through the
//! session state machine, drives the remote command bridge, and exposes
//! the gateway that conversational front ends connect to.

pub mod auth;
pub mod dispatcher;
pub mod gateway;
pub mod machine;
pub mod outbox;
pub mod render;
pub mod session;

pub use auth::AllowList;
pub use dispatcher::Dispatcher;
pub use gateway::GatewayServer;
pub use machine::SessionState;
