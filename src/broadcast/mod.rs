//! Message fan-out
//!
//! The broadcaster is the single serialization point for publishes: every
//! live subscriber sees concurrent posts in one identical global order.

pub mod broadcaster;

pub use broadcaster::Broadcaster;
