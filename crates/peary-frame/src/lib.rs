//! Length-prefixed request/response framing for the peary protocol.
//!
//! Every message on the wire is framed with:
//! - A 4-byte big-endian length counting the header and payload
//! - A 2-byte big-endian tag matching a reply to its request
//! - A 2-byte big-endian status, zero on success
//!
//! [`FrameChannel`] turns a byte stream into whole frames, so callers never
//! deal with partial reads.

pub mod channel;
pub mod codec;
pub mod error;

pub use channel::{FrameChannel, DEFAULT_BUFFER_SIZE};
pub use codec::{
    decode_frame, encode_frame, frame_length, Frame, HEADER_SIZE, LENGTH_SIZE, MAX_PAYLOAD,
    STATUS_OK,
};
pub use error::{FrameError, Result};
