/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The host name did not resolve to any socket address.
    #[error("failed to resolve {host}:{port}")]
    Resolve { host: String, port: u16 },

    /// Failed to connect to the specified address.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream accepted fewer bytes than a whole request frame.
    #[error("failed to send request: wrote {sent} of {expected} bytes")]
    SendFailed { sent: usize, expected: usize },

    /// No bytes at all arrived for a response.
    #[error("failed to receive response")]
    ReceiveFailed,

    /// The transport has been shut down.
    #[error("transport shut down")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
