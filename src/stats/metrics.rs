//! Statistics and metrics for relay sessions

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Session-level statistics
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Messages posted on this connection
    pub messages_posted: u64,
    /// Messages delivered to this connection's peer
    pub messages_delivered: u64,
    /// Keep-alives sent to this connection's peer
    pub pings_sent: u64,
}

/// Snapshot of server-wide statistics
#[derive(Debug, Clone)]
pub struct RelayStats {
    /// Total connections ever accepted
    pub total_connections: u64,
    /// Currently open connections
    pub active_connections: u64,
    /// Messages accepted through the send path
    pub messages_posted: u64,
    /// Per-subscriber deliveries written to peers
    pub messages_delivered: u64,
    /// Keep-alives written to peers
    pub pings_sent: u64,
    /// Server uptime
    pub uptime: Duration,
}

/// Server-wide counters, updated concurrently by connection tasks
#[derive(Debug)]
pub struct RelayMetrics {
    total_connections: AtomicU64,
    active_connections: AtomicU64,
    messages_posted: AtomicU64,
    messages_delivered: AtomicU64,
    pings_sent: AtomicU64,
    started_at: Instant,
}

impl RelayMetrics {
    /// Create a fresh counter set
    pub fn new() -> Self {
        Self {
            total_connections: AtomicU64::new(0),
            active_connections: AtomicU64::new(0),
            messages_posted: AtomicU64::new(0),
            messages_delivered: AtomicU64::new(0),
            pings_sent: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    /// Record an accepted connection
    pub fn connection_opened(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a closed connection
    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record a post accepted through the send path
    pub fn on_post(&self) {
        self.messages_posted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a message written to one peer
    pub fn on_delivered(&self) {
        self.messages_delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a keep-alive written to one peer
    pub fn on_ping(&self) {
        self.pings_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a consistent-enough snapshot for logging or display
    pub fn snapshot(&self) -> RelayStats {
        RelayStats {
            total_connections: self.total_connections.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
            messages_posted: self.messages_posted.load(Ordering::Relaxed),
            messages_delivered: self.messages_delivered.load(Ordering::Relaxed),
            pings_sent: self.pings_sent.load(Ordering::Relaxed),
            uptime: self.started_at.elapsed(),
        }
    }
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}
