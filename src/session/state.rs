//! Session state machine
//!
//! Tracks one connection from accept to teardown. A connection starts in
//! post mode and may switch into streaming mode once; streaming ends only
//! by detaching.

use std::net::SocketAddr;
use std::time::Instant;

use crate::registry::SubscriberId;
use crate::stats::SessionStats;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// TCP connected; accepting post requests
    Connected,
    /// Subscribed: attached to the registry, draining its channel
    Streaming,
    /// Stream ended; mandatory unregister has run
    Detached,
    /// Session closed
    Closed,
}

/// Complete per-connection state
#[derive(Debug)]
pub struct SessionState {
    /// Unique session ID
    pub id: u64,

    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// Current phase
    pub phase: SessionPhase,

    /// Connection start time
    pub connected_at: Instant,

    /// Registry id held while streaming
    pub subscriber_id: Option<SubscriberId>,

    /// Per-session counters
    pub stats: SessionStats,
}

impl SessionState {
    /// Create a new session state
    pub fn new(id: u64, peer_addr: SocketAddr) -> Self {
        Self {
            id,
            peer_addr,
            phase: SessionPhase::Connected,
            connected_at: Instant::now(),
            subscriber_id: None,
            stats: SessionStats::default(),
        }
    }

    /// Enter streaming mode with the given registry id
    pub fn start_streaming(&mut self, subscriber_id: SubscriberId) {
        if self.phase == SessionPhase::Connected {
            self.phase = SessionPhase::Streaming;
            self.subscriber_id = Some(subscriber_id);
        }
    }

    /// Leave streaming mode after the registry entry is removed
    pub fn detach(&mut self) {
        if self.phase == SessionPhase::Streaming {
            self.phase = SessionPhase::Detached;
            self.subscriber_id = None;
        }
    }

    /// Close the session
    pub fn close(&mut self) {
        self.phase = SessionPhase::Closed;
    }

    /// Check if the session is in streaming mode
    pub fn is_streaming(&self) -> bool {
        self.phase == SessionPhase::Streaming
    }

    /// Get session duration
    pub fn duration(&self) -> std::time::Duration {
        self.connected_at.elapsed()
    }

    /// Record an accepted post
    pub fn on_post(&mut self) {
        self.stats.messages_posted += 1;
    }

    /// Record a message delivered to the peer
    pub fn on_delivered(&mut self) {
        self.stats.messages_delivered += 1;
    }

    /// Record a keep-alive sent to the peer
    pub fn on_ping(&mut self) {
        self.stats.pings_sent += 1;
    }
}
