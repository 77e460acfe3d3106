//! Crate-level error types
//!
//! Connection-local failures stay connection-local: nothing in here
//! escalates to a process-wide failure.

use crate::registry::RegistryError;

/// Convenience result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for relay operations
#[derive(Debug)]
pub enum Error {
    /// I/O error on a client connection or the listener
    Io(std::io::Error),
    /// Malformed or unknown wire frame
    Protocol(String),
    /// Post rejected: sender must be non-empty
    InvalidSender,
    /// Post rejected by the installed handler
    Rejected(String),
    /// Registry operation failed
    Registry(RegistryError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Protocol(msg) => write!(f, "Protocol error: {}", msg),
            Error::InvalidSender => write!(f, "Sender must not be empty"),
            Error::Rejected(reason) => write!(f, "Post rejected: {}", reason),
            Error::Registry(e) => write!(f, "Registry error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Registry(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Protocol(e.to_string())
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::Registry(e)
    }
}
