//! Message broadcaster
//!
//! Fans each published message out to every channel in a registry
//! snapshot. Publishes are serialized by the broadcaster's own mutex so
//! that all subscribers observe one identical interleaving of concurrent
//! posts; the registry lock itself is only held for the snapshot copy.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::registry::{ChatMessage, SubscriberRegistry};

/// Fan-out engine over a subscriber registry
pub struct Broadcaster {
    registry: Arc<SubscriberRegistry>,

    /// Serialization point for publishes. Held across the push loop, which
    /// never blocks: pushes onto unbounded channels always complete
    /// immediately.
    publish_lock: Mutex<()>,
}

impl Broadcaster {
    /// Create a broadcaster over the given registry
    pub fn new(registry: Arc<SubscriberRegistry>) -> Self {
        Self {
            registry,
            publish_lock: Mutex::new(()),
        }
    }

    /// The registry this broadcaster fans out to
    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }

    /// The send path: validate, construct the message, and publish it
    ///
    /// Rejects an empty `sender` before anything reaches the fan-out.
    /// Empty `text` is accepted; the relay carries whatever the client
    /// chose to send.
    pub async fn post_message(&self, sender: &str, text: &str) -> Result<()> {
        if sender.is_empty() {
            return Err(Error::InvalidSender);
        }

        tracing::info!(sender = %sender, text = %text, "Message posted");
        self.publish(ChatMessage::new(sender, text)).await;
        Ok(())
    }

    /// Push a copy of `message` onto every currently registered channel
    ///
    /// Returns once every push is enqueued. A subscriber whose channel is
    /// already closed is logged and skipped; it never delays or aborts
    /// delivery to the others. A channel registered after the snapshot is
    /// taken does not receive this message.
    pub async fn publish(&self, message: ChatMessage) {
        let _serialized = self.publish_lock.lock().await;

        let snapshot = self.registry.snapshot().await;
        let mut delivered = 0usize;

        for handle in &snapshot {
            match handle.push(message.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        subscriber_id = handle.id(),
                        error = %e,
                        "Push skipped"
                    );
                }
            }
        }

        tracing::debug!(
            subscribers = snapshot.len(),
            delivered = delivered,
            "Message broadcast"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::registry::IdleRecv;

    use super::*;

    fn relay() -> (Arc<SubscriberRegistry>, Broadcaster) {
        let registry = Arc::new(SubscriberRegistry::new());
        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        (registry, broadcaster)
    }

    #[tokio::test]
    async fn test_post_reaches_every_subscriber_once() {
        let (registry, broadcaster) = relay();
        let mut s1 = registry.register().await;
        let mut s2 = registry.register().await;

        broadcaster.post_message("alice", "hi").await.unwrap();
        broadcaster.post_message("bob", "yo").await.unwrap();

        for sub in [&mut s1, &mut s2] {
            let first = sub.recv().await.unwrap();
            assert_eq!(first, ChatMessage::new("alice", "hi"));
            let second = sub.recv().await.unwrap();
            assert_eq!(second, ChatMessage::new("bob", "yo"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_sender_rejected_and_nothing_delivered() {
        let (registry, broadcaster) = relay();
        let mut s1 = registry.register().await;

        let err = broadcaster.post_message("", "hi").await.unwrap_err();
        assert!(matches!(err, Error::InvalidSender));

        let outcome = s1.next_or_idle(Duration::from_secs(1)).await;
        assert!(matches!(outcome, IdleRecv::Idle));
    }

    #[tokio::test]
    async fn test_empty_text_accepted() {
        let (registry, broadcaster) = relay();
        let mut s1 = registry.register().await;

        broadcaster.post_message("alice", "").await.unwrap();

        let msg = s1.recv().await.unwrap();
        assert_eq!(msg, ChatMessage::new("alice", ""));
    }

    #[tokio::test]
    async fn test_publish_to_empty_registry_succeeds() {
        let (registry, broadcaster) = relay();

        let sub = registry.register().await;
        registry.unregister(sub.id()).await;

        // No channel left to receive it; publish must still succeed.
        broadcaster.post_message("bob", "yo").await.unwrap();
        assert_eq!(registry.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn test_push_failure_is_isolated() {
        let (registry, broadcaster) = relay();

        let a = registry.register().await;
        let mut b = registry.register().await;
        let mut c = registry.register().await;

        // Simulate a wedged subscriber: the receiving half disappears
        // without unregistering, so the push onto A's channel fails.
        drop(a);

        broadcaster.post_message("alice", "hi").await.unwrap();

        assert_eq!(b.recv().await.unwrap(), ChatMessage::new("alice", "hi"));
        assert_eq!(c.recv().await.unwrap(), ChatMessage::new("alice", "hi"));
    }

    #[tokio::test]
    async fn test_never_reading_subscriber_accumulates_in_order() {
        let (registry, broadcaster) = relay();
        let mut sub = registry.register().await;

        for i in 0..500 {
            broadcaster
                .post_message("alice", &format!("msg-{}", i))
                .await
                .unwrap();
        }

        for i in 0..500 {
            let msg = sub.recv().await.unwrap();
            assert_eq!(msg.text, format!("msg-{}", i));
        }
    }

    #[tokio::test]
    async fn test_concurrent_publishes_share_one_global_order() {
        let (registry, broadcaster) = relay();
        let broadcaster = Arc::new(broadcaster);

        let mut s1 = registry.register().await;
        let mut s2 = registry.register().await;
        let mut s3 = registry.register().await;

        let senders = ["alice", "bob", "carol", "dave"];
        let per_sender = 25usize;

        let mut tasks = Vec::new();
        for sender in senders {
            let broadcaster = Arc::clone(&broadcaster);
            tasks.push(tokio::spawn(async move {
                for i in 0..per_sender {
                    broadcaster
                        .post_message(sender, &format!("{}-{}", sender, i))
                        .await
                        .unwrap();
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let total = senders.len() * per_sender;
        let mut sequences = Vec::new();
        for sub in [&mut s1, &mut s2, &mut s3] {
            let mut seq = Vec::with_capacity(total);
            for _ in 0..total {
                seq.push(sub.recv().await.unwrap());
            }
            sequences.push(seq);
        }

        // Every subscriber observes the same interleaving, and each
        // sender's own messages stay in submission order within it.
        assert_eq!(sequences[0], sequences[1]);
        assert_eq!(sequences[1], sequences[2]);

        for sender in senders {
            let own: Vec<_> = sequences[0]
                .iter()
                .filter(|m| m.sender == sender)
                .map(|m| m.text.clone())
                .collect();
            let expected: Vec<_> = (0..per_sender).map(|i| format!("{}-{}", sender, i)).collect();
            assert_eq!(own, expected);
        }
    }

    #[tokio::test]
    async fn test_late_registration_misses_in_flight_message() {
        let (registry, broadcaster) = relay();
        let mut early = registry.register().await;

        broadcaster.post_message("alice", "first").await.unwrap();

        let mut late = registry.register().await;
        broadcaster.post_message("alice", "second").await.unwrap();

        assert_eq!(early.recv().await.unwrap().text, "first");
        assert_eq!(early.recv().await.unwrap().text, "second");
        assert_eq!(late.recv().await.unwrap().text, "second");
    }
}
