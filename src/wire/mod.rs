//! Wire protocol
//!
//! Newline-delimited JSON over TCP. The core consumes the transport only
//! through these frames: `Post` is a unary request answered by `Ack` or
//! `Error`; `Subscribe` turns the connection into a server-driven stream
//! of `Message` frames.

pub mod frame;

pub use frame::{ClientRequest, ServerFrame};
