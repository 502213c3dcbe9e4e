use std::cell::RefCell;
use std::net::TcpStream;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use peary_device::Proxy;
use peary_session::{ProtocolHandle, Session};
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// A connection to a peary daemon.
///
/// Dereferences to the [`Proxy`] that manages the daemon's devices. The
/// connection is closed by [`Client::close`] or when the client is dropped.
pub struct Client {
    session: Rc<RefCell<Session<TcpStream>>>,
    proxy: Proxy,
    host: String,
    port: u16,
}

impl Client {
    /// Connect to `host:port` with default settings.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        Self::connect_with_config(&ClientConfig::new(host, port))
    }

    /// Connect and, unless disabled, verify the daemon's protocol version.
    pub fn connect_with_config(config: &ClientConfig) -> Result<Self> {
        let stream = peary_transport::connect(&config.host, config.port, config.timeout())
            .map_err(|source| Error::Connect {
                host: config.host.clone(),
                port: config.port,
                source,
            })?;

        let session = Rc::new(RefCell::new(Session::with_config(
            stream,
            config.session_config(),
        )?));
        let protocol: ProtocolHandle = session.clone();
        info!(host = %config.host, port = config.port, "connected to peary daemon");

        Ok(Self {
            session,
            proxy: Proxy::new(protocol),
            host: config.host.clone(),
            port: config.port,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn proxy(&self) -> &Proxy {
        &self.proxy
    }

    pub fn proxy_mut(&mut self) -> &mut Proxy {
        &mut self.proxy
    }

    /// Whether the connection has been closed, explicitly or after a fatal
    /// protocol error.
    pub fn is_closed(&self) -> bool {
        self.session.borrow().is_closed()
    }

    /// Shut the connection down. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        self.session.borrow_mut().close()?;
        Ok(())
    }
}

impl Deref for Client {
    type Target = Proxy;

    fn deref(&self) -> &Proxy {
        &self.proxy
    }
}

impl DerefMut for Client {
    fn deref_mut(&mut self) -> &mut Proxy {
        &mut self.proxy
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(host = %self.host, port = self.port, error = %err, "failed to close connection");
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("closed", &self.is_closed())
            .field("proxy", &self.proxy)
            .finish()
    }
}

/// Connect, run `f` against the device proxy, then close the connection.
///
/// The connection is closed whether or not `f` succeeds. An error from `f`
/// takes precedence over an error while closing.
pub fn with_client<T, F>(config: &ClientConfig, f: F) -> Result<T>
where
    F: FnOnce(&mut Proxy) -> Result<T>,
{
    let mut client = Client::connect_with_config(config)?;
    let result = f(client.proxy_mut());
    let closed = client.close();
    let value = result?;
    closed?;
    Ok(value)
}
