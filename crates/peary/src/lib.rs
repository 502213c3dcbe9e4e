//! Client library for the peary instrumentation daemon.
//!
//! peary talks to a remote daemon over TCP using length-prefixed, tagged
//! request/response frames. Devices are created on the daemon by type name and
//! driven through per-device commands.
//!
//! # Crate Structure
//!
//! - [`transport`]: byte streams, TCP connect with timeout
//! - [`frame`]: frame codec and a channel that reassembles partial reads
//! - [`session`]: tag sequencing, status checks, version handshake
//! - [`device`]: device handles, supply wrappers, the device registry
//!
//! [`Client`] ties the layers together:
//!
//! ```no_run
//! use peary::{Client, ClientConfig};
//!
//! # fn main() -> peary::Result<()> {
//! let mut client = Client::connect_with_config(&ClientConfig::default())?;
//! let device = client.add_device("SpacelyCaribouBasic")?;
//! device.power_on()?;
//! client.close()?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;

pub use client::{with_client, Client};
pub use config::ClientConfig;
pub use error::{Error, Result};

pub use peary_device::{Device, DeviceClass, Proxy};

/// Re-export transport types.
pub mod transport {
    pub use peary_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use peary_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use peary_session::*;
}

/// Re-export device types.
pub mod device {
    pub use peary_device::*;
}
