use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

/// A connected byte stream to a peary daemon.
///
/// This is the fundamental I/O capability the client is built on. Reads and
/// writes are single calls: `send` may accept fewer bytes than offered and
/// `recv` may return fewer bytes than the buffer holds. Callers decide what a
/// short transfer means.
pub trait Stream {
    /// Write as much of `data` as the stream accepts in one call.
    fn send(&mut self, data: &[u8]) -> std::io::Result<usize>;

    /// Read at most `buf.len()` bytes. `Ok(0)` means the peer closed.
    fn recv(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;

    /// Non-blocking probe: is more data readable right now?
    fn has_pending_data(&self) -> std::io::Result<bool>;

    /// Apply a read and write timeout to the stream.
    fn set_timeout(&mut self, timeout: Option<Duration>) -> std::io::Result<()>;

    /// Shut down both directions of the stream.
    fn shutdown(&mut self) -> std::io::Result<()>;
}

impl Stream for TcpStream {
    fn send(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.write(data)
    }

    fn recv(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.read(buf)
    }

    #[cfg(unix)]
    fn has_pending_data(&self) -> std::io::Result<bool> {
        use std::os::fd::AsRawFd;

        let mut pollfd = libc::pollfd {
            fd: self.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };

        // SAFETY: `pollfd` is a valid, writable array of one element and the
        // descriptor is an open socket owned by this stream.
        let rc = unsafe { libc::poll(&mut pollfd, 1, 0) };
        if rc < 0 {
            return Err(std::io::Error::last_os_error());
        }
        Ok(rc > 0 && pollfd.revents & libc::POLLIN != 0)
    }

    #[cfg(not(unix))]
    fn has_pending_data(&self) -> std::io::Result<bool> {
        self.set_nonblocking(true)?;
        let mut probe = [0u8; 1];
        let result = self.peek(&mut probe);
        self.set_nonblocking(false)?;
        match result {
            Ok(n) => Ok(n > 0),
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn set_timeout(&mut self, timeout: Option<Duration>) -> std::io::Result<()> {
        self.set_read_timeout(timeout)?;
        self.set_write_timeout(timeout)
    }

    fn shutdown(&mut self) -> std::io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}
