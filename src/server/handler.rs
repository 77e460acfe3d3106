//! Server callback trait
//!
//! Lets embedders observe and veto connection events without touching the
//! relay core. All methods have accept-everything defaults.

use std::future::Future;

use crate::registry::ChatMessage;
use crate::session::SessionContext;

/// Decision returned by `on_post`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostDecision {
    /// Relay the message
    Accept,
    /// Refuse it; the reason is sent back to the posting client
    Reject(String),
}

/// Callbacks invoked by the relay server
pub trait ChatHandler: Send + Sync + 'static {
    /// Called when a connection is accepted; return `false` to drop it
    fn on_connection(&self, ctx: &SessionContext) -> impl Future<Output = bool> + Send {
        let _ = ctx;
        async { true }
    }

    /// Called for each post that passed validation; may still reject it
    fn on_post(
        &self,
        ctx: &SessionContext,
        message: &ChatMessage,
    ) -> impl Future<Output = PostDecision> + Send {
        let _ = (ctx, message);
        async { PostDecision::Accept }
    }

    /// Called when a connection switches into streaming mode
    fn on_subscribe(&self, ctx: &SessionContext) -> impl Future<Output = ()> + Send {
        let _ = ctx;
        async {}
    }

    /// Called once when the connection is torn down
    fn on_disconnect(&self, ctx: &SessionContext) -> impl Future<Output = ()> + Send {
        let _ = ctx;
        async {}
    }
}

/// Handler that accepts every connection and every post
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHandler;

impl ChatHandler for DefaultHandler {}
