//! Chat relay client
//!
//! Headless client halves, split by role:
//! - `MessagePoster` posts messages and awaits acks
//! - `MessageSubscriber` drains the server's message stream
//!
//! An interactive UI sits on top of these; it is not part of this crate.

pub mod poster;
pub mod subscriber;

pub use poster::MessagePoster;
pub use subscriber::MessageSubscriber;
