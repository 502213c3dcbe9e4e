use std::net::TcpStream;

use tracing::info;

use crate::error::Result;
use crate::session::{Session, SessionConfig};

/// Connect to a peary daemon and complete the version handshake.
pub fn connect(host: &str, port: u16) -> Result<Session<TcpStream>> {
    connect_with_config(host, port, SessionConfig::default())
}

/// Connect with explicit configuration.
///
/// The configured timeout bounds the TCP connect as well as every read and
/// write that follows.
pub fn connect_with_config(
    host: &str,
    port: u16,
    config: SessionConfig,
) -> Result<Session<TcpStream>> {
    let stream = peary_transport::connect(host, port, config.timeout)?;
    let session = Session::with_config(stream, config)?;
    info!(host, port, "session established");
    Ok(session)
}
