use std::io::ErrorKind;
use std::time::Duration;

use bytes::BytesMut;
use peary_transport::{Result, Stream, TransportError};
use tracing::{debug, trace};

use crate::codec::{frame_length, LENGTH_SIZE};

/// Default size of a single receive call.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Sends whole frames to, and collects whole frames from, a [`Stream`].
///
/// The channel owns the stream. Closing it shuts the stream down in both
/// directions before releasing it; a closed channel rejects further I/O.
pub struct FrameChannel<S: Stream> {
    inner: Option<S>,
}

impl<S: Stream> FrameChannel<S> {
    /// Wrap a connected stream.
    pub fn new(inner: S) -> Self {
        Self { inner: Some(inner) }
    }

    /// Wrap a connected stream and apply a read/write timeout to it.
    pub fn with_timeout(mut inner: S, timeout: Option<Duration>) -> Result<Self> {
        inner.set_timeout(timeout)?;
        Ok(Self::new(inner))
    }

    /// Send one encoded frame in a single write.
    ///
    /// A write that accepts fewer bytes than the frame is a hard failure: the
    /// protocol has no way to resume a partially sent request.
    pub fn send_frame(&mut self, data: &[u8]) -> Result<usize> {
        let stream = self.stream_mut()?;
        let sent = loop {
            match stream.send(data) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        };

        if sent != data.len() {
            return Err(TransportError::SendFailed {
                sent,
                expected: data.len(),
            });
        }
        trace!(bytes = sent, "sent frame");
        Ok(sent)
    }

    /// Collect the bytes of one reply frame.
    ///
    /// Reads up to `buffer_size` bytes at a time. Stops once the length
    /// prefix says the frame is complete, when a read comes back short, or
    /// when nothing more is waiting on the stream. Reads are capped at the
    /// bytes the frame still needs (the length prefix first, then the rest),
    /// so a following frame is never consumed.
    pub fn recv_frame(&mut self, buffer_size: usize) -> Result<BytesMut> {
        let stream = self.stream_mut()?;
        let mut chunk = vec![0u8; buffer_size.max(1)];
        let mut data = BytesMut::with_capacity(chunk.len());

        loop {
            let missing = match frame_length(&data) {
                Some(total) => total - data.len(),
                None => LENGTH_SIZE - data.len(),
            };
            let want = chunk.len().min(missing);

            let read = match stream.recv(&mut chunk[..want]) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            };
            data.extend_from_slice(&chunk[..read]);

            if frame_length(&data).is_some_and(|total| data.len() >= total) {
                break;
            }
            if read < want || !stream.has_pending_data()? {
                break;
            }
        }

        if data.is_empty() {
            return Err(TransportError::ReceiveFailed);
        }
        trace!(bytes = data.len(), "received frame");
        Ok(data)
    }

    /// Whether the channel has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Shut the stream down in both directions, then release it.
    ///
    /// Closing an already closed channel does nothing.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut stream) = self.inner.take() else {
            return Ok(());
        };
        let result = stream.shutdown();
        drop(stream);
        debug!("channel closed");
        match result {
            Ok(()) => Ok(()),
            // The peer may already have torn the connection down.
            Err(err) if err.kind() == ErrorKind::NotConnected => Ok(()),
            Err(err) => Err(TransportError::Io(err)),
        }
    }

    fn stream_mut(&mut self) -> Result<&mut S> {
        self.inner.as_mut().ok_or(TransportError::Closed)
    }
}

impl<S: Stream> Drop for FrameChannel<S> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl<S: Stream> std::fmt::Debug for FrameChannel<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameChannel")
            .field("closed", &self.is_closed())
            .finish()
    }
}
