//! Subscriber registry implementation
//!
//! The central registry that tracks every live subscriber channel and
//! hands out consistent snapshots for fan-out.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, Mutex};

use super::channel::{ChannelHandle, SubscriberId, Subscription};
use super::message::ChatMessage;

/// Central registry of live subscriber channels
///
/// One mutex guards the whole live set; it is the set, not the entries,
/// that is contended. The lock is held only for the brief map operation
/// in each method, never across I/O or the broadcaster's push loop.
pub struct SubscriberRegistry {
    /// Map of subscriber id to the sending half of its channel
    subscribers: Mutex<HashMap<SubscriberId, mpsc::UnboundedSender<ChatMessage>>>,

    /// Next subscriber id to allocate
    next_id: AtomicU64,
}

impl SubscriberRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a new subscriber
    ///
    /// Allocates a fresh unbounded channel, adds its sending half to the
    /// live set, and returns the receiving half bundled with its id.
    pub async fn register(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        let count = {
            let mut subscribers = self.subscribers.lock().await;
            subscribers.insert(id, tx);
            subscribers.len()
        };

        tracing::info!(subscriber_id = id, subscribers = count, "Subscriber registered");

        Subscription::new(id, rx)
    }

    /// Remove a subscriber from the live set
    ///
    /// Idempotent: removing an id that is already gone is a no-op.
    /// Dropping the sending half closes the channel, so a drain loop still
    /// blocked on it observes the closure.
    pub async fn unregister(&self, id: SubscriberId) {
        let (removed, count) = {
            let mut subscribers = self.subscribers.lock().await;
            (subscribers.remove(&id).is_some(), subscribers.len())
        };

        if removed {
            tracing::info!(subscriber_id = id, subscribers = count, "Subscriber removed");
        } else {
            tracing::debug!(subscriber_id = id, "Unregister for absent subscriber ignored");
        }
    }

    /// Snapshot the current live set for iteration by the broadcaster
    ///
    /// The clone happens under the lock, so a channel is either fully
    /// present or fully absent; the caller iterates with the lock released.
    pub async fn snapshot(&self) -> Vec<ChannelHandle> {
        let subscribers = self.subscribers.lock().await;
        subscribers
            .iter()
            .map(|(id, tx)| ChannelHandle::new(*id, tx.clone()))
            .collect()
    }

    /// Number of currently registered subscribers
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_grows_live_set() {
        let registry = SubscriberRegistry::new();
        assert_eq!(registry.subscriber_count().await, 0);

        let _s1 = registry.register().await;
        let _s2 = registry.register().await;

        assert_eq!(registry.subscriber_count().await, 2);
    }

    #[tokio::test]
    async fn test_register_then_unregister_is_size_neutral() {
        let registry = SubscriberRegistry::new();
        let before = registry.subscriber_count().await;

        let sub = registry.register().await;
        registry.unregister(sub.id()).await;

        assert_eq!(registry.subscriber_count().await, before);
    }

    #[tokio::test]
    async fn test_double_unregister_is_a_no_op() {
        let registry = SubscriberRegistry::new();
        let sub = registry.register().await;

        registry.unregister(sub.id()).await;
        registry.unregister(sub.id()).await;

        assert_eq!(registry.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn test_snapshot_excludes_removed_subscriber() {
        let registry = SubscriberRegistry::new();
        let s1 = registry.register().await;
        let s2 = registry.register().await;

        registry.unregister(s1.id()).await;

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id(), s2.id());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let registry = SubscriberRegistry::new();
        let s1 = registry.register().await;
        let s2 = registry.register().await;
        let s3 = registry.register().await;

        assert_ne!(s1.id(), s2.id());
        assert_ne!(s2.id(), s3.id());
    }

    #[tokio::test]
    async fn test_concurrent_register_unregister() {
        use std::sync::Arc;

        let registry = Arc::new(SubscriberRegistry::new());
        let mut handles = Vec::new();

        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    let sub = registry.register().await;
                    registry.unregister(sub.id()).await;
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.subscriber_count().await, 0);
    }
}
