use peary_device::DeviceError;
use peary_session::ProtocolError;
use peary_transport::TransportError;

/// Errors surfaced by [`Client`](crate::Client).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The daemon could not be reached.
    #[error("unable to connect to host {host} using port {port}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: TransportError,
    },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    /// A configuration document could not be parsed.
    #[error("invalid client configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
