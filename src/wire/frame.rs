//! Wire frame types
//!
//! One JSON object per line in each direction. Requests carry a `cmd`
//! tag, server frames a `type` tag, so either side can reject unknown
//! frames without tearing the connection down.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::registry::ChatMessage;

/// A request from client to server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ClientRequest {
    /// Post one message; answered by `Ack` or `Error`
    Post { sender: String, text: String },
    /// Switch this connection into streaming mode
    Subscribe,
}

/// A frame from server to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Post accepted; no payload
    Ack,
    /// Request rejected; the connection stays usable
    Error { reason: String },
    /// One relayed message on a streaming connection
    Message { sender: String, text: String },
}

impl ClientRequest {
    /// Decode one request line
    pub fn decode(line: &str) -> Result<Self> {
        serde_json::from_str(line).map_err(Error::from)
    }

    /// Encode as a single line, newline included
    pub fn encode(&self) -> Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

impl ServerFrame {
    /// Decode one server frame line
    pub fn decode(line: &str) -> Result<Self> {
        serde_json::from_str(line).map_err(Error::from)
    }

    /// Encode as a single line, newline included
    pub fn encode(&self) -> Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    /// Recover the message from a `Message` frame
    pub fn into_message(self) -> Option<ChatMessage> {
        match self {
            ServerFrame::Message { sender, text } => Some(ChatMessage::new(sender, text)),
            _ => None,
        }
    }
}

impl From<ChatMessage> for ServerFrame {
    fn from(msg: ChatMessage) -> Self {
        ServerFrame::Message {
            sender: msg.sender,
            text: msg.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_post() {
        let req =
            ClientRequest::decode(r#"{"cmd":"post","sender":"alice","text":"hi"}"#).unwrap();
        assert_eq!(
            req,
            ClientRequest::Post {
                sender: "alice".into(),
                text: "hi".into()
            }
        );
    }

    #[test]
    fn test_decode_subscribe() {
        let req = ClientRequest::decode(r#"{"cmd":"subscribe"}"#).unwrap();
        assert_eq!(req, ClientRequest::Subscribe);
    }

    #[test]
    fn test_unknown_cmd_rejected() {
        let result = ClientRequest::decode(r#"{"cmd":"shout","text":"HI"}"#);
        assert!(matches!(result, Err(Error::Protocol(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(ClientRequest::decode("not json").is_err());
    }

    #[test]
    fn test_message_frame_wire_shape() {
        let frame = ServerFrame::from(ChatMessage::new("alice", "hi"));
        let line = frame.encode().unwrap();
        assert_eq!(line, "{\"type\":\"message\",\"sender\":\"alice\",\"text\":\"hi\"}\n");
    }

    #[test]
    fn test_multiline_text_stays_one_line() {
        // JSON escapes the newline, so framing survives multi-line bodies.
        let frame = ServerFrame::from(ChatMessage::new("alice", "hi\nthere"));
        let line = frame.encode().unwrap();
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.ends_with('\n'));

        let back = ServerFrame::decode(line.trim_end()).unwrap();
        assert_eq!(back.into_message().unwrap().text, "hi\nthere");
    }

    #[test]
    fn test_into_message() {
        assert!(ServerFrame::Ack.into_message().is_none());
        let msg = ServerFrame::Message {
            sender: "server".into(),
            text: "ping".into(),
        };
        assert!(msg.into_message().unwrap().is_keep_alive());
    }
}
