//! Byte-stream transport abstraction for the peary client.
//!
//! The client only needs a handful of operations from its connection to the
//! daemon: send, receive, a non-blocking "is more data waiting" probe, a
//! timeout and an orderly shutdown. The [`Stream`] trait captures exactly
//! that, so test doubles can stand in for a real socket.
//!
//! This is the lowest layer of the client. Everything else builds on top of
//! a [`Stream`], usually the [`std::net::TcpStream`] returned by [`connect`].

pub mod error;
pub mod tcp;
pub mod traits;

pub use error::{Result, TransportError};
pub use tcp::{connect, DEFAULT_PORT};
pub use traits::Stream;
