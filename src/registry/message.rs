//! Chat message value type
//!
//! Messages are immutable once constructed and cloned per delivery, so
//! every subscriber drains its own copy.

use serde::{Deserialize, Serialize};

/// Reserved sender identity for server-originated messages
pub const SERVER_SENDER: &str = "server";

/// Payload of the keep-alive message emitted on idle streams
pub const KEEP_ALIVE_TEXT: &str = "ping";

/// A single chat message
///
/// `sender` is a short display identifier and must be non-empty when the
/// message enters through the send path; `text` may be empty or multi-line.
/// There is no id, timestamp, or sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Display identifier of the sender
    pub sender: String,
    /// Message body
    pub text: String,
}

impl ChatMessage {
    /// Create a new message
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
        }
    }

    /// The server-originated keep-alive message sent to idle subscribers
    pub fn keep_alive() -> Self {
        Self::new(SERVER_SENDER, KEEP_ALIVE_TEXT)
    }

    /// Whether this is the reserved keep-alive message
    ///
    /// Clients may use this to suppress pings from display.
    pub fn is_keep_alive(&self) -> bool {
        self.sender == SERVER_SENDER && self.text == KEEP_ALIVE_TEXT
    }
}

impl std::fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.sender, self.text)
    }
}
