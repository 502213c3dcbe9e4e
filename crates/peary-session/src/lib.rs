//! Sequenced request/response sessions with a peary daemon.
//!
//! A [`Session`] owns one connection. Each request is tagged with the next
//! sequence number, sent as a single frame, and answered by exactly one reply
//! frame that must carry the same tag and a zero status. Sessions start with
//! a protocol version handshake unless it is switched off for test doubles.

pub mod command;
pub mod connector;
pub mod error;
pub mod handshake;
pub mod session;

pub use connector::{connect, connect_with_config};
pub use error::{ProtocolError, Result};
pub use handshake::{verify_version, PROTOCOL_VERSION};
pub use session::{Protocol, ProtocolHandle, Session, SessionConfig, SessionState};
