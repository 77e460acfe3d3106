//! Per-connection session state
//!
//! One session per accepted TCP connection: a read-only context handed to
//! handler callbacks, and the lifecycle state machine the connection
//! driver walks from accept to teardown.

pub mod context;
pub mod state;

pub use context::SessionContext;
pub use state::{SessionPhase, SessionState};
