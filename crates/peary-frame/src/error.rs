/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Not even the length prefix could be read.
    #[error("insufficient number of bytes: {len}")]
    InsufficientBytes { len: usize },

    /// The length prefix disagrees with the number of bytes supplied.
    #[error("incorrect number of bytes (length prefix {declared}, received {received})")]
    LengthMismatch { declared: usize, received: usize },

    /// The length prefix is too small to cover the tag/status header.
    #[error("frame length {length} is shorter than the header")]
    ShortHeader { length: usize },

    /// The payload does not fit the 32-bit length prefix.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
