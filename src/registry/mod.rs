//! Subscriber registry for chat fan-out
//!
//! The registry tracks the set of currently connected receivers, each
//! represented by its own unbounded delivery channel. The broadcaster
//! consults it for a consistent snapshot on every publish.
//!
//! # Architecture
//!
//! ```text
//!                    Arc<SubscriberRegistry>
//!                 ┌──────────────────────────┐
//!                 │ subscribers: Mutex<      │
//!                 │   HashMap<SubscriberId,  │
//!                 │     UnboundedSender>     │
//!                 │ >                        │
//!                 └───────────┬──────────────┘
//!                             │ snapshot()
//!          ┌──────────────────┼──────────────────┐
//!          │                  │                  │
//!          ▼                  ▼                  ▼
//!     [Broadcaster]     [Subscription]     [Subscription]
//!     publish()         next_or_idle()     next_or_idle()
//!          │                  │                  │
//!          └─► push per handle└─► wire frame ──► TCP
//! ```
//!
//! A channel belongs to the live set exactly while its owning connection
//! is active: `register()` on attach, `unregister()` on every detach path.
//! Queues are unbounded, so a stalled consumer grows without limit; a
//! bounded queue with an overflow policy is a documented extension point.

pub mod channel;
pub mod error;
pub mod message;
pub mod store;

pub use channel::{ChannelHandle, IdleRecv, SubscriberId, Subscription};
pub use error::RegistryError;
pub use message::{ChatMessage, KEEP_ALIVE_TEXT, SERVER_SENDER};
pub use store::SubscriberRegistry;
