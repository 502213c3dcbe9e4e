use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Size of the length prefix.
pub const LENGTH_SIZE: usize = 4;

/// Frame header: tag (2) + status (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Status value reported by a successful reply.
pub const STATUS_OK: u16 = 0;

/// Largest payload the 32-bit length prefix can describe.
pub const MAX_PAYLOAD: usize = u32::MAX as usize - HEADER_SIZE;

/// A tagged request or reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Sequence number pairing a reply with its request.
    pub tag: u16,
    /// Zero on success, an error code otherwise.
    pub status: u16,
    /// Command text or reply data.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(tag: u16, status: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            tag,
            status,
            payload: payload.into(),
        }
    }

    /// Whether the frame carries [`STATUS_OK`].
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬───────────┬───────────┬──────────────────┐
/// │ Length (4B)  │ Tag (2B)  │ Status    │ Payload          │
/// │ BE, 4 + len  │ BE        │ (2B BE)   │ (len bytes)      │
/// └──────────────┴───────────┴───────────┴──────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], tag: u16, status: u16, dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(LENGTH_SIZE + HEADER_SIZE + payload.len());
    dst.put_u32((HEADER_SIZE + payload.len()) as u32);
    dst.put_u16(tag);
    dst.put_u16(status);
    dst.put_slice(payload);
    Ok(())
}

/// Decode exactly one frame from `data`.
///
/// `data` must hold the length prefix and precisely the number of bytes it
/// announces; anything shorter or longer is rejected.
pub fn decode_frame(data: &[u8]) -> Result<Frame> {
    let length = read_length(data).ok_or(FrameError::InsufficientBytes { len: data.len() })?;

    let received = data.len() - LENGTH_SIZE;
    if received != length {
        return Err(FrameError::LengthMismatch {
            declared: length,
            received,
        });
    }
    if length < HEADER_SIZE {
        return Err(FrameError::ShortHeader { length });
    }

    let tag = u16::from_be_bytes([data[4], data[5]]);
    let status = u16::from_be_bytes([data[6], data[7]]);
    let payload = Bytes::copy_from_slice(&data[LENGTH_SIZE + HEADER_SIZE..]);

    Ok(Frame {
        tag,
        status,
        payload,
    })
}

/// Total wire size announced by the length prefix at the start of `data`.
///
/// Returns `None` until all four prefix bytes are available.
pub fn frame_length(data: &[u8]) -> Option<usize> {
    read_length(data).map(|length| LENGTH_SIZE + length)
}

fn read_length(data: &[u8]) -> Option<usize> {
    let prefix: [u8; LENGTH_SIZE] = data.get(..LENGTH_SIZE)?.try_into().ok()?;
    Some(u32::from_be_bytes(prefix) as usize)
}
