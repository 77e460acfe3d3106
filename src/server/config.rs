//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

/// Default idle interval after which a keep-alive is sent to a subscriber
pub const DEFAULT_IDLE_PING_INTERVAL: Duration = Duration::from_secs(10);

/// Server configuration options
///
/// Supplied at startup and immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Maximum concurrent connections (0 = unlimited)
    pub max_connections: usize,

    /// Idle interval after which a streaming connection gets a keep-alive
    /// instead of being closed
    pub idle_ping_interval: Duration,

    /// Worker threads for the runtime (0 = tokio default); applied by the
    /// binary when it builds the runtime
    pub worker_threads: usize,

    /// Enable TCP_NODELAY on accepted sockets
    pub tcp_nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".parse().unwrap(),
            max_connections: 0, // Unlimited
            idle_ping_interval: DEFAULT_IDLE_PING_INTERVAL,
            worker_threads: 0,
            tcp_nodelay: true,
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the idle keep-alive interval
    pub fn idle_ping_interval(mut self, interval: Duration) -> Self {
        self.idle_ping_interval = interval;
        self
    }

    /// Set the worker thread count
    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }
}
