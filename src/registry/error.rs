//! Registry error types

use super::channel::SubscriberId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The subscriber's receiving half is gone; the push was skipped
    ChannelClosed(SubscriberId),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::ChannelClosed(id) => {
                write!(f, "Subscriber channel closed: {}", id)
            }
        }
    }
}

impl std::error::Error for RegistryError {}
