use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use peary_frame::{decode_frame, encode_frame, FrameChannel, DEFAULT_BUFFER_SIZE, STATUS_OK};
use peary_transport::Stream;
use tracing::{debug, info, warn};

use crate::command::join_command;
use crate::error::{ProtocolError, Result};
use crate::handshake::{verify_version, PROTOCOL_VERSION};

/// Something that can issue commands to a peary daemon.
///
/// [`Session`] is the real implementation; devices and the proxy only see
/// this trait, so tests can substitute a scripted double.
pub trait Protocol {
    /// Send `command` with `args` and return the reply payload.
    fn request(&mut self, command: &str, args: &[&str]) -> Result<Bytes>;

    /// Release the underlying connection.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A protocol shared by every device on one connection.
///
/// Access is single-threaded; the `RefCell` serializes requests.
pub type ProtocolHandle = Rc<RefCell<dyn Protocol>>;

/// Configuration for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Read/write timeout applied to the stream.
    pub timeout: Duration,
    /// Run the protocol version handshake on construction.
    pub check_version: bool,
    /// Version token the daemon must report.
    pub protocol_version: String,
    /// Size of a single receive call.
    pub buffer_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            check_version: true,
            protocol_version: PROTOCOL_VERSION.to_string(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Lifecycle of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, no request outstanding.
    Ready,
    /// Closed explicitly or after a fatal error.
    Closed,
}

/// One tagged request/response connection to a peary daemon.
pub struct Session<S: Stream> {
    channel: FrameChannel<S>,
    tag: u16,
    config: SessionConfig,
}

impl<S: Stream> Session<S> {
    /// Open a session with default configuration.
    pub fn new(stream: S) -> Result<Self> {
        Self::with_config(stream, SessionConfig::default())
    }

    /// Open a session with explicit configuration.
    ///
    /// Applies the timeout and, unless disabled, verifies the daemon's
    /// protocol version before returning.
    pub fn with_config(stream: S, config: SessionConfig) -> Result<Self> {
        let channel = FrameChannel::with_timeout(stream, Some(config.timeout))?;
        let mut session = Self {
            channel,
            tag: 0,
            config,
        };

        if session.config.check_version {
            let expected = session.config.protocol_version.clone();
            verify_version(&mut session, &expected)?;
            info!(version = %expected, "protocol version verified");
        }

        Ok(session)
    }

    /// Send a request and return the reply payload.
    pub fn request(&mut self, command: &str, args: &[&str]) -> Result<Bytes> {
        self.request_with_buffer_size(command, args, self.config.buffer_size)
    }

    /// Send a request, reading the reply `buffer_size` bytes at a time.
    ///
    /// Any error other than a failed reply status closes the session.
    pub fn request_with_buffer_size(
        &mut self,
        command: &str,
        args: &[&str],
        buffer_size: usize,
    ) -> Result<Bytes> {
        let result = self.exchange(command, args, buffer_size);
        if let Err(err) = &result {
            if err.is_fatal() && !self.channel.is_closed() {
                warn!(command, error = %err, "closing session after fatal error");
                let _ = self.channel.close();
            }
        }
        result
    }

    fn exchange(&mut self, command: &str, args: &[&str], buffer_size: usize) -> Result<Bytes> {
        if self.channel.is_closed() {
            return Err(ProtocolError::Closed);
        }

        let tag = self.next_tag();
        let payload = join_command(command, args);
        let mut wire = BytesMut::new();
        encode_frame(payload.as_bytes(), tag, STATUS_OK, &mut wire)?;

        debug!(tag, command, "sending request");
        self.channel.send_frame(&wire)?;

        let data = self.channel.recv_frame(buffer_size)?;
        let reply = decode_frame(&data)?;
        debug!(tag = reply.tag, status = reply.status, "received reply");

        if !reply.is_ok() {
            return Err(ProtocolError::Status {
                command: command.to_string(),
                status: reply.status,
                reason: String::from_utf8_lossy(&reply.payload).into_owned(),
            });
        }
        if reply.tag != tag {
            return Err(ProtocolError::Sequence {
                command: command.to_string(),
                expected: tag,
                received: reply.tag,
            });
        }

        Ok(reply.payload)
    }

    // Tags start at 1 and skip 0 when the counter wraps.
    fn next_tag(&mut self) -> u16 {
        self.tag = self.tag.wrapping_add(1);
        if self.tag == 0 {
            self.tag = 1;
        }
        self.tag
    }

    /// Tag of the most recent request, 0 before the first one.
    pub fn last_tag(&self) -> u16 {
        self.tag
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        if self.channel.is_closed() {
            SessionState::Closed
        } else {
            SessionState::Ready
        }
    }

    /// Whether the session has been closed.
    pub fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }

    /// Shut the connection down in both directions and release it.
    ///
    /// Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        self.channel.close().map_err(Into::into)
    }
}

impl<S: Stream> Protocol for Session<S> {
    fn request(&mut self, command: &str, args: &[&str]) -> Result<Bytes> {
        Session::request(self, command, args)
    }

    fn close(&mut self) -> Result<()> {
        Session::close(self)
    }
}

impl<S: Stream> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("last_tag", &self.tag)
            .field("config", &self.config)
            .finish()
    }
}
