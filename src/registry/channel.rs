//! Per-subscriber delivery channel
//!
//! Each registered subscriber owns the receiving half of an unbounded FIFO
//! channel for the lifetime of one streaming connection. The registry keeps
//! the sending half; the broadcaster pushes through cloned handles taken
//! from a registry snapshot.

use std::time::Duration;

use tokio::sync::mpsc;

use super::error::RegistryError;
use super::message::ChatMessage;

/// Unique identifier of a registered subscriber
pub type SubscriberId = u64;

/// Sending half of a subscriber channel, as handed out by a registry
/// snapshot
///
/// Cheap to clone; pushing is non-blocking because the queue is unbounded.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    id: SubscriberId,
    tx: mpsc::UnboundedSender<ChatMessage>,
}

impl ChannelHandle {
    pub(super) fn new(id: SubscriberId, tx: mpsc::UnboundedSender<ChatMessage>) -> Self {
        Self { id, tx }
    }

    /// The subscriber this handle delivers to
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Enqueue a message for this subscriber
    ///
    /// Fails only if the receiving half has been dropped, which the
    /// broadcaster treats as a skip for this subscriber, never a retry.
    pub fn push(&self, message: ChatMessage) -> Result<(), RegistryError> {
        self.tx
            .send(message)
            .map_err(|_| RegistryError::ChannelClosed(self.id))
    }
}

/// Outcome of one wait on a subscriber channel
#[derive(Debug)]
pub enum IdleRecv {
    /// A message arrived within the idle interval
    Message(ChatMessage),
    /// The idle interval elapsed with nothing queued
    Idle,
    /// The registry dropped the sending half; the subscription is dead
    Closed,
}

/// Receiving half of a subscriber channel, owned by one streaming
/// connection from registration to teardown
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::UnboundedReceiver<ChatMessage>,
}

impl Subscription {
    pub(super) fn new(id: SubscriberId, rx: mpsc::UnboundedReceiver<ChatMessage>) -> Self {
        Self { id, rx }
    }

    /// The registry id of this subscription
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next queued message
    ///
    /// Returns `None` once the sending half is gone.
    pub async fn recv(&mut self) -> Option<ChatMessage> {
        self.rx.recv().await
    }

    /// Wait for the next queued message, giving up after `idle` elapses
    ///
    /// This is the drain-loop primitive: on `Idle` the connection emits a
    /// keep-alive instead of closing the stream.
    pub async fn next_or_idle(&mut self, idle: Duration) -> IdleRecv {
        match tokio::time::timeout(idle, self.rx.recv()).await {
            Ok(Some(message)) => IdleRecv::Message(message),
            Ok(None) => IdleRecv::Closed,
            Err(_) => IdleRecv::Idle,
        }
    }
}
