//! Server and session statistics

pub mod metrics;

pub use metrics::{RelayMetrics, RelayStats, SessionStats};
