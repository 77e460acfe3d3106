//! Subscribing client
//!
//! Opens a streaming connection and yields each relayed message.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::error::{Error, Result};
use crate::registry::ChatMessage;
use crate::wire::{ClientRequest, ServerFrame};

/// Client half that receives the message stream
///
/// Keep-alive messages are yielded like any other; callers that don't
/// want to display them can filter with `ChatMessage::is_keep_alive()`.
/// Dropping the subscriber closes the connection, which the server
/// observes as a detach.
pub struct MessageSubscriber {
    reader: BufReader<OwnedReadHalf>,
    // Held so the connection's write direction stays open for the
    // stream's lifetime.
    _writer: OwnedWriteHalf,
    line: String,
}

impl MessageSubscriber {
    /// Connect to a relay server and enter streaming mode
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let socket = TcpStream::connect(addr).await?;
        socket.set_nodelay(true)?;

        let (read_half, mut writer) = socket.into_split();
        writer
            .write_all(ClientRequest::Subscribe.encode()?.as_bytes())
            .await?;

        Ok(Self {
            reader: BufReader::new(read_half),
            _writer: writer,
            line: String::new(),
        })
    }

    /// Wait for the next message from the relay
    ///
    /// Returns `Ok(None)` once the server closes the stream.
    pub async fn next(&mut self) -> Result<Option<ChatMessage>> {
        self.line.clear();
        let n = self.reader.read_line(&mut self.line).await?;
        if n == 0 {
            return Ok(None);
        }

        let frame = ServerFrame::decode(self.line.trim())?;
        frame
            .into_message()
            .map(Some)
            .ok_or_else(|| Error::Protocol("unexpected frame on message stream".into()))
    }
}
