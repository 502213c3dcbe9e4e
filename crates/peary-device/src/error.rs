/// Local bookkeeping errors of the device registry. These never touch the wire.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A device was already registered under this name.
    #[error("Device already exists: {0}")]
    DuplicateName(String),

    /// No device is registered under this name.
    #[error("Unknown device: {0}")]
    UnknownName(String),

    /// The device was registered as a different device class.
    #[error("device {name} is not a {expected}")]
    ClassMismatch { name: String, expected: &'static str },
}

/// Errors that can occur in device operations.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Session-level error.
    #[error("protocol error: {0}")]
    Protocol(#[from] peary_session::ProtocolError),

    /// Registry bookkeeping error.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A reply expected to be text was not valid UTF-8.
    #[error("reply to '{command}' is not valid UTF-8")]
    InvalidUtf8 { command: String },

    /// A reply could not be parsed as the expected value.
    #[error("cannot parse reply '{value}' to '{command}': {reason}")]
    Parse {
        command: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, DeviceError>;
