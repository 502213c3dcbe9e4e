/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] peary_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] peary_frame::FrameError),

    /// The daemon ran the command and reported a failure.
    #[error("failed response status {status} from request '{command}': {reason}")]
    Status {
        command: String,
        status: u16,
        reason: String,
    },

    /// The reply tag does not belong to the outstanding request.
    #[error("received out of order response to '{command}': {received} != {expected}")]
    Sequence {
        command: String,
        expected: u16,
        received: u16,
    },

    /// The daemon speaks a different protocol version.
    #[error("unsupported protocol version '{received}' (expected '{expected}')")]
    VersionMismatch { expected: String, received: String },

    /// The session has been closed.
    #[error("session closed")]
    Closed,
}

impl ProtocolError {
    /// Whether the error leaves the session unusable.
    ///
    /// Only a failed command status keeps the connection alive; everything
    /// else means the stream can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ProtocolError::Status { .. })
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
