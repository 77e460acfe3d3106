//! Chat relay server listener
//!
//! Handles the TCP accept loop and spawns connection drivers.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::broadcast::Broadcaster;
use crate::error::Result;
use crate::registry::SubscriberRegistry;
use crate::server::config::ServerConfig;
use crate::server::connection::Connection;
use crate::server::handler::ChatHandler;
use crate::stats::{RelayMetrics, RelayStats};

/// Chat relay server
///
/// Owns the registry and broadcaster for one server instance; both are
/// passed explicitly to every connection — there is no ambient state.
pub struct ChatServer<H: ChatHandler> {
    config: ServerConfig,
    handler: Arc<H>,
    registry: Arc<SubscriberRegistry>,
    broadcaster: Arc<Broadcaster>,
    metrics: Arc<RelayMetrics>,
    next_session_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl<H: ChatHandler> ChatServer<H> {
    /// Create a new server with the given configuration and handler
    pub fn new(config: ServerConfig, handler: H) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        let registry = Arc::new(SubscriberRegistry::new());
        let broadcaster = Arc::new(Broadcaster::new(Arc::clone(&registry)));

        Self {
            config,
            handler: Arc::new(handler),
            registry,
            broadcaster,
            metrics: Arc::new(RelayMetrics::new()),
            next_session_id: AtomicU64::new(1),
            connection_semaphore,
        }
    }

    /// Get a reference to the subscriber registry
    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }

    /// Get a reference to the broadcaster
    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.broadcaster
    }

    /// Get a snapshot of the server-wide counters
    pub fn stats(&self) -> RelayStats {
        self.metrics.snapshot()
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Run the server
    ///
    /// This method blocks until the server is shut down.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Chat relay listening");
        self.serve(listener).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Chat relay listening");

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.serve(listener) => result,
        }
    }

    /// Accept connections from an already-bound listener
    ///
    /// Useful when the caller needs the actual bound address, e.g. when
    /// binding to port 0.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        // Check connection limit; the permit rides along with the task so
        // the slot is held for the whole connection lifetime.
        let permit = if let Some(ref sem) = self.connection_semaphore {
            match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    return;
                }
            }
        } else {
            None
        };

        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(session_id = session_id, peer = %peer_addr, "New connection");

        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::warn!(session_id = session_id, error = %e, "Failed to set TCP_NODELAY");
            }
        }

        let config = self.config.clone();
        let handler = Arc::clone(&self.handler);
        let registry = Arc::clone(&self.registry);
        let broadcaster = Arc::clone(&self.broadcaster);
        let metrics = Arc::clone(&self.metrics);

        metrics.connection_opened();

        tokio::spawn(async move {
            let _permit = permit;

            let mut connection = Connection::new(
                session_id,
                peer_addr,
                config,
                handler,
                registry,
                broadcaster,
                Arc::clone(&metrics),
            );

            if let Err(e) = connection.run(socket).await {
                tracing::debug!(session_id = session_id, error = %e, "Connection error");
            }

            metrics.connection_closed();
            tracing::debug!(session_id = session_id, "Connection closed");
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use crate::client::{MessagePoster, MessageSubscriber};
    use crate::registry::ChatMessage;
    use crate::server::handler::DefaultHandler;

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    async fn start_server(config: ServerConfig) -> (Arc<ChatServer<DefaultHandler>>, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Arc::new(ChatServer::new(config, DefaultHandler));

        let accept = Arc::clone(&server);
        tokio::spawn(async move {
            let _ = accept.serve(listener).await;
        });

        (server, addr)
    }

    async fn wait_for_subscribers(server: &ChatServer<DefaultHandler>, count: usize) {
        timeout(WAIT, async {
            while server.registry().subscriber_count().await != count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("registry never reached expected size");
    }

    #[tokio::test]
    async fn test_post_is_relayed_to_every_subscriber() {
        let (server, addr) = start_server(ServerConfig::default()).await;

        let mut sub1 = MessageSubscriber::connect(addr).await.unwrap();
        let mut sub2 = MessageSubscriber::connect(addr).await.unwrap();
        wait_for_subscribers(&server, 2).await;

        let mut poster = MessagePoster::connect(addr).await.unwrap();
        poster.post("alice", "hi").await.unwrap();

        for sub in [&mut sub1, &mut sub2] {
            let msg = timeout(WAIT, sub.next()).await.unwrap().unwrap().unwrap();
            assert_eq!(msg, ChatMessage::new("alice", "hi"));
        }
    }

    #[tokio::test]
    async fn test_empty_sender_is_rejected_at_the_wire() {
        let (server, addr) = start_server(ServerConfig::default()).await;

        let mut sub = MessageSubscriber::connect(addr).await.unwrap();
        wait_for_subscribers(&server, 1).await;

        let mut poster = MessagePoster::connect(addr).await.unwrap();
        let err = poster.post("", "hi").await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Rejected(_)));

        // A valid post afterwards proves the connection survived and that
        // the rejected one was never relayed.
        poster.post("bob", "yo").await.unwrap();
        let msg = timeout(WAIT, sub.next()).await.unwrap().unwrap().unwrap();
        assert_eq!(msg, ChatMessage::new("bob", "yo"));
    }

    #[tokio::test]
    async fn test_idle_subscriber_receives_keep_alive() {
        let config = ServerConfig::default().idle_ping_interval(Duration::from_millis(50));
        let (server, addr) = start_server(config).await;

        let mut sub = MessageSubscriber::connect(addr).await.unwrap();
        wait_for_subscribers(&server, 1).await;

        let msg = timeout(WAIT, sub.next()).await.unwrap().unwrap().unwrap();
        assert!(msg.is_keep_alive());
    }

    #[tokio::test]
    async fn test_disconnect_shrinks_the_registry() {
        let (server, addr) = start_server(ServerConfig::default()).await;

        let sub = MessageSubscriber::connect(addr).await.unwrap();
        wait_for_subscribers(&server, 1).await;

        drop(sub);
        wait_for_subscribers(&server, 0).await;

        // Posting into the now-empty registry still succeeds.
        let mut poster = MessagePoster::connect(addr).await.unwrap();
        poster.post("bob", "yo").await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_request_gets_error_reply() {
        use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

        let (_server, addr) = start_server(ServerConfig::default()).await;

        let socket = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = socket.into_split();
        let mut reader = BufReader::new(read_half);

        write_half.write_all(b"{\"cmd\":\"shout\"}\n").await.unwrap();
        let mut line = String::new();
        timeout(WAIT, reader.read_line(&mut line)).await.unwrap().unwrap();
        let frame = crate::wire::ServerFrame::decode(line.trim()).unwrap();
        assert!(matches!(frame, crate::wire::ServerFrame::Error { .. }));

        // Connection survives malformed input.
        write_half
            .write_all(b"{\"cmd\":\"post\",\"sender\":\"alice\",\"text\":\"hi\"}\n")
            .await
            .unwrap();
        line.clear();
        timeout(WAIT, reader.read_line(&mut line)).await.unwrap().unwrap();
        let frame = crate::wire::ServerFrame::decode(line.trim()).unwrap();
        assert!(matches!(frame, crate::wire::ServerFrame::Ack));
    }

    #[tokio::test]
    async fn test_stats_track_relay_activity() {
        let (server, addr) = start_server(ServerConfig::default()).await;

        let mut sub = MessageSubscriber::connect(addr).await.unwrap();
        wait_for_subscribers(&server, 1).await;

        let mut poster = MessagePoster::connect(addr).await.unwrap();
        poster.post("alice", "hi").await.unwrap();
        let _ = timeout(WAIT, sub.next()).await.unwrap().unwrap().unwrap();

        let stats = server.stats();
        assert_eq!(stats.messages_posted, 1);
        assert!(stats.total_connections >= 2);
    }
}
