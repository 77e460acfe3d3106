//! Per-connection driver
//!
//! Reads requests off one accepted socket. Posts are answered inline; a
//! `subscribe` request switches the connection into streaming mode, where
//! it drains its registry channel until the peer goes away.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::broadcast::Broadcaster;
use crate::error::Result;
use crate::registry::{ChatMessage, IdleRecv, SubscriberRegistry, Subscription};
use crate::server::config::ServerConfig;
use crate::server::handler::{ChatHandler, PostDecision};
use crate::session::{SessionContext, SessionState};
use crate::stats::RelayMetrics;
use crate::wire::{ClientRequest, ServerFrame};

/// One accepted client connection
pub struct Connection<H: ChatHandler> {
    config: ServerConfig,
    handler: Arc<H>,
    registry: Arc<SubscriberRegistry>,
    broadcaster: Arc<Broadcaster>,
    metrics: Arc<RelayMetrics>,
    state: SessionState,
}

impl<H: ChatHandler> Connection<H> {
    /// Create a new connection driver
    pub fn new(
        session_id: u64,
        peer_addr: SocketAddr,
        config: ServerConfig,
        handler: Arc<H>,
        registry: Arc<SubscriberRegistry>,
        broadcaster: Arc<Broadcaster>,
        metrics: Arc<RelayMetrics>,
    ) -> Self {
        Self {
            config,
            handler,
            registry,
            broadcaster,
            metrics,
            state: SessionState::new(session_id, peer_addr),
        }
    }

    /// Drive the connection until the peer disconnects or errors out
    pub async fn run(&mut self, socket: TcpStream) -> Result<()> {
        let ctx = SessionContext::new(self.state.id, self.state.peer_addr);

        if !self.handler.on_connection(&ctx).await {
            tracing::debug!(session_id = self.state.id, "Connection refused by handler");
            return Ok(());
        }

        let (read_half, mut writer) = socket.into_split();
        let mut reader = BufReader::new(read_half);

        let result = self.serve(&mut reader, &mut writer, &ctx).await;

        self.state.close();
        self.handler.on_disconnect(&ctx).await;
        result
    }

    /// Request loop for a connection in post mode
    async fn serve<R, W>(
        &mut self,
        reader: &mut R,
        writer: &mut W,
        ctx: &SessionContext,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            let n = reader.read_line(&mut line).await?;
            if n == 0 {
                return Ok(()); // peer closed
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match ClientRequest::decode(trimmed) {
                Ok(ClientRequest::Post { sender, text }) => {
                    let reply = self.handle_post(ctx, &sender, &text).await;
                    write_frame(writer, &reply).await?;
                }
                Ok(ClientRequest::Subscribe) => {
                    self.handler.on_subscribe(ctx).await;
                    return self.stream_messages(reader, writer).await;
                }
                Err(e) => {
                    tracing::debug!(
                        session_id = self.state.id,
                        error = %e,
                        "Malformed request"
                    );
                    let reply = ServerFrame::Error {
                        reason: e.to_string(),
                    };
                    write_frame(writer, &reply).await?;
                }
            }
        }
    }

    /// The send path for one post request
    ///
    /// Validation failures and handler rejections become `Error` replies;
    /// they never reach the fan-out and never affect other connections.
    async fn handle_post(&mut self, ctx: &SessionContext, sender: &str, text: &str) -> ServerFrame {
        let message = ChatMessage::new(sender, text);
        if let PostDecision::Reject(reason) = self.handler.on_post(ctx, &message).await {
            tracing::debug!(session_id = self.state.id, reason = %reason, "Post rejected by handler");
            return ServerFrame::Error { reason };
        }

        match self.broadcaster.post_message(sender, text).await {
            Ok(()) => {
                self.state.on_post();
                self.metrics.on_post();
                ServerFrame::Ack
            }
            Err(e) => ServerFrame::Error {
                reason: e.to_string(),
            },
        }
    }

    /// Streaming mode: attach, drain, detach
    ///
    /// `unregister` runs after the drain loop on every exit path — peer
    /// EOF, transport error, or channel closure — so no registry entry
    /// outlives its connection.
    async fn stream_messages<R, W>(&mut self, reader: &mut R, writer: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut subscription = self.registry.register().await;
        self.state.start_streaming(subscription.id());
        tracing::debug!(
            session_id = self.state.id,
            subscriber_id = subscription.id(),
            "Stream attached"
        );

        let result = drain(
            &mut subscription,
            reader,
            writer,
            self.config.idle_ping_interval,
            &mut self.state,
            &self.metrics,
        )
        .await;

        self.registry.unregister(subscription.id()).await;
        self.state.detach();
        tracing::debug!(
            session_id = self.state.id,
            delivered = self.state.stats.messages_delivered,
            pings = self.state.stats.pings_sent,
            "Stream detached"
        );

        result
    }
}

/// Drain loop for one subscription
///
/// Emits each queued message to the peer as it arrives; after
/// `idle_ping` without traffic, emits the keep-alive instead of closing.
/// Exits on peer EOF, channel closure, or a transport error.
async fn drain<R, W>(
    subscription: &mut Subscription,
    reader: &mut R,
    writer: &mut W,
    idle_ping: Duration,
    state: &mut SessionState,
    metrics: &RelayMetrics,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut peer_line = String::new();

    loop {
        tokio::select! {
            outcome = subscription.next_or_idle(idle_ping) => match outcome {
                IdleRecv::Message(message) => {
                    write_frame(writer, &ServerFrame::from(message)).await?;
                    state.on_delivered();
                    metrics.on_delivered();
                }
                IdleRecv::Idle => {
                    write_frame(writer, &ServerFrame::from(ChatMessage::keep_alive())).await?;
                    state.on_ping();
                    metrics.on_ping();
                }
                IdleRecv::Closed => return Ok(()),
            },
            read = reader.read_line(&mut peer_line) => match read {
                Ok(0) => return Ok(()), // peer closed the stream
                Ok(_) => peer_line.clear(), // streaming connections carry no further requests
                Err(e) => return Err(e.into()),
            },
        }
    }
}

async fn write_frame<W>(writer: &mut W, frame: &ServerFrame) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let line = frame.encode()?;
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
