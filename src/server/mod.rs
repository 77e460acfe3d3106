//! Chat relay server
//!
//! TCP accept loop, per-connection drivers, and the embedder-facing
//! handler trait. One `ChatServer` instance owns one registry and one
//! broadcaster; connection tasks get explicit `Arc` handles to both.

pub mod config;
pub mod connection;
pub mod handler;
pub mod listener;

pub use config::{ServerConfig, DEFAULT_IDLE_PING_INTERVAL};
pub use handler::{ChatHandler, DefaultHandler, PostDecision};
pub use listener::ChatServer;
