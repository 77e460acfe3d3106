//! Handler context
//!
//! Context passed to handler callbacks containing session information.

use std::net::SocketAddr;
use std::time::Instant;

/// Context passed to `ChatHandler` callbacks
///
/// Read-only view of one client connection. Decisions that change
/// behavior are made through the return values of handler methods.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Unique session ID
    pub session_id: u64,

    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// When the connection was accepted
    pub connected_at: Instant,
}

impl SessionContext {
    /// Create a new context
    pub fn new(session_id: u64, peer_addr: SocketAddr) -> Self {
        Self {
            session_id,
            peer_addr,
            connected_at: Instant::now(),
        }
    }

    /// How long this session has been connected
    pub fn duration(&self) -> std::time::Duration {
        self.connected_at.elapsed()
    }
}
