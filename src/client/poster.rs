//! Posting client
//!
//! Sends messages to the relay and waits for the per-post acknowledgement.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::error::{Error, Result};
use crate::wire::{ClientRequest, ServerFrame};

/// Client half that posts messages
///
/// Holds one connection open and reuses it for every post; each post is a
/// unary exchange answered by an ack or an error.
pub struct MessagePoster {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    line: String,
}

impl MessagePoster {
    /// Connect to a relay server
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let socket = TcpStream::connect(addr).await?;
        socket.set_nodelay(true)?;

        let (read_half, writer) = socket.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer,
            line: String::new(),
        })
    }

    /// Post one message and wait for the server's reply
    ///
    /// A server-side rejection (empty sender, handler veto) surfaces as
    /// `Error::Rejected`; the connection stays usable afterwards.
    pub async fn post(&mut self, sender: &str, text: &str) -> Result<()> {
        let request = ClientRequest::Post {
            sender: sender.to_owned(),
            text: text.to_owned(),
        };
        self.writer.write_all(request.encode()?.as_bytes()).await?;

        self.line.clear();
        let n = self.reader.read_line(&mut self.line).await?;
        if n == 0 {
            return Err(Error::Protocol("connection closed before ack".into()));
        }

        match ServerFrame::decode(self.line.trim())? {
            ServerFrame::Ack => Ok(()),
            ServerFrame::Error { reason } => Err(Error::Rejected(reason)),
            other => Err(Error::Protocol(format!("unexpected reply: {:?}", other))),
        }
    }
}
