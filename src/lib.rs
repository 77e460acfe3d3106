//! # chat-relay
//!
//! A minimal multi-client chat relay: clients post short text messages
//! and receive every message posted by any client, in near-real-time,
//! over a persistent streaming connection.
//!
//! The core is the broadcast engine: a [`SubscriberRegistry`] tracking one
//! unbounded delivery channel per connected receiver, and a
//! [`Broadcaster`] that fans each posted message out to a consistent
//! snapshot of that set. Everything else — wire frames, the TCP server,
//! the headless client — is plumbing around those two.
//!
//! # Server example
//!
//! ```no_run
//! use chat_relay::{ChatServer, DefaultHandler, ServerConfig};
//!
//! # async fn example() -> chat_relay::Result<()> {
//! let config = ServerConfig::default().bind("127.0.0.1:8080".parse().unwrap());
//! let server = ChatServer::new(config, DefaultHandler);
//! server.run().await
//! # }
//! ```
//!
//! # Client example
//!
//! ```no_run
//! use chat_relay::client::{MessagePoster, MessageSubscriber};
//!
//! # async fn example() -> chat_relay::Result<()> {
//! let mut subscriber = MessageSubscriber::connect("127.0.0.1:8080").await?;
//! let mut poster = MessagePoster::connect("127.0.0.1:8080").await?;
//!
//! poster.post("alice", "hi").await?;
//! while let Some(message) = subscriber.next().await? {
//!     if !message.is_keep_alive() {
//!         println!("{}", message);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod broadcast;
pub mod client;
pub mod error;
pub mod registry;
pub mod server;
pub mod session;
pub mod stats;
pub mod wire;

pub use broadcast::Broadcaster;
pub use error::{Error, Result};
pub use registry::{ChatMessage, SubscriberRegistry, Subscription};
pub use server::{ChatHandler, ChatServer, DefaultHandler, ServerConfig};
