use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};

/// Port a peary daemon listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 12345;

/// Connect to a peary daemon over TCP (blocking).
///
/// Every resolved address is tried in turn with `timeout` as the connect
/// deadline. The same timeout is then applied to reads and writes on the
/// returned stream.
pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream> {
    let addrs: Vec<_> = (host, port)
        .to_socket_addrs()
        .map_err(|e| TransportError::Connect {
            addr: format!("{host}:{port}"),
            source: e,
        })?
        .collect();

    if addrs.is_empty() {
        return Err(TransportError::Resolve {
            host: host.to_string(),
            port,
        });
    }

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))?;
                stream.set_nodelay(true)?;
                debug!(%addr, "connected to peary daemon");
                return Ok(stream);
            }
            Err(err) => {
                debug!(%addr, error = %err, "connect attempt failed");
                last_err = Some(err);
            }
        }
    }

    Err(TransportError::Connect {
        addr: format!("{host}:{port}"),
        source: last_err.unwrap_or_else(|| std::io::Error::other("no address attempted")),
    })
}
