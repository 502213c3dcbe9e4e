use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use bytes::Bytes;
use peary_session::command::device_command;
use peary_session::ProtocolHandle;
use tracing::trace;

use crate::error::{DeviceError, Result};

/// A device class layered over a plain [`Device`].
///
/// The proxy hands a freshly created device to [`DeviceClass::bind`], which
/// may issue setup commands before the wrapper is registered.
pub trait DeviceClass: Sized + 'static {
    /// Wrap a newly created device.
    fn bind(device: Rc<Device>) -> Result<Self>;

    /// The wrapped device.
    fn device(&self) -> &Rc<Device>;
}

/// A device on the remote daemon, addressed by its index.
///
/// The handle holds no state besides its identity: the index assigned by the
/// daemon and the device type, fetched once on first use.
pub struct Device {
    index: u32,
    protocol: ProtocolHandle,
    name: OnceCell<String>,
}

impl Device {
    /// Create a handle for the device at `index`.
    pub fn new(index: u32, protocol: ProtocolHandle) -> Self {
        Self {
            index,
            protocol,
            name: OnceCell::new(),
        }
    }

    /// The daemon-assigned index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The device type reported by the daemon.
    ///
    /// Requested on first access and cached for the life of the handle.
    pub fn name(&self) -> Result<&str> {
        if let Some(name) = self.cached_name() {
            return Ok(name);
        }
        let fetched = self.request_text("name", &[])?;
        trace!(index = self.index, name = %fetched, "fetched device name");
        Ok(self.name.get_or_init(|| fetched).as_str())
    }

    /// The device type, if it has been fetched already.
    pub fn cached_name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    /// Send `device.<command> <index> <args...>` and return the raw reply.
    pub fn request(&self, command: &str, args: &[&str]) -> Result<Bytes> {
        let command = device_command(command);
        let index = self.index.to_string();
        let mut full_args = Vec::with_capacity(args.len() + 1);
        full_args.push(index.as_str());
        full_args.extend_from_slice(args);

        let reply = self.protocol.borrow_mut().request(&command, &full_args)?;
        Ok(reply)
    }

    fn request_text(&self, command: &str, args: &[&str]) -> Result<String> {
        let reply = self.request(command, args)?;
        String::from_utf8(reply.to_vec()).map_err(|_| DeviceError::InvalidUtf8 {
            command: device_command(command),
        })
    }

    fn request_value<T>(&self, command: &str, args: &[&str]) -> Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let text = self.request_text(command, args)?;
        text.trim().parse().map_err(|err: T::Err| DeviceError::Parse {
            command: device_command(command),
            value: text.clone(),
            reason: err.to_string(),
        })
    }

    /// Power on the device.
    pub fn power_on(&self) -> Result<Bytes> {
        self.request("power_on", &[])
    }

    /// Power off the device.
    pub fn power_off(&self) -> Result<Bytes> {
        self.request("power_off", &[])
    }

    /// Reset the device.
    pub fn reset(&self) -> Result<Bytes> {
        self.request("reset", &[])
    }

    /// Initialize and configure the device.
    pub fn configure(&self) -> Result<Bytes> {
        self.request("configure", &[])
    }

    /// Start data acquisition.
    pub fn daq_start(&self) -> Result<Bytes> {
        self.request("daq_start", &[])
    }

    /// Stop data acquisition.
    pub fn daq_stop(&self) -> Result<Bytes> {
        self.request("daq_stop", &[])
    }

    /// Names of all available registers.
    pub fn list_registers(&self) -> Result<Vec<String>> {
        let text = self.request_text("list_registers", &[])?;
        Ok(text.split_whitespace().map(str::to_string).collect())
    }

    /// Read a named register.
    pub fn get_register(&self, name: &str) -> Result<i64> {
        self.request_value("get_register", &[name])
    }

    /// Write a named register.
    pub fn set_register(&self, name: &str, value: i64) -> Result<Bytes> {
        self.request("set_register", &[name, &value.to_string()])
    }

    /// Read a named memory.
    pub fn get_memory(&self, name: &str) -> Result<i64> {
        self.request_value("get_memory", &[name])
    }

    /// Write a named memory.
    pub fn set_memory(&self, name: &str, value: i64) -> Result<Bytes> {
        self.request("set_memory", &[name, &value.to_string()])
    }

    /// Measured current of a named periphery port.
    pub fn get_current(&self, name: &str) -> Result<f64> {
        self.request_value("get_current", &[name])
    }

    /// Set the current of a named periphery port.
    pub fn set_current(&self, name: &str, value: f64) -> Result<Bytes> {
        self.request("set_current", &[name, &value.to_string()])
    }

    /// Measured voltage of a named periphery port.
    pub fn get_voltage(&self, name: &str) -> Result<f64> {
        self.request_value("get_voltage", &[name])
    }

    /// Set the voltage of a named periphery port.
    pub fn set_voltage(&self, name: &str, value: f64) -> Result<Bytes> {
        self.request("set_voltage", &[name, &value.to_string()])
    }

    /// Switch on a periphery port.
    pub fn switch_on(&self, name: &str) -> Result<Bytes> {
        self.request("switch_on", &[name])
    }

    /// Switch off a periphery port.
    pub fn switch_off(&self, name: &str) -> Result<Bytes> {
        self.request("switch_off", &[name])
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cached_name() {
            Some(name) => write!(f, "{name}({})", self.index),
            None => write!(f, "device({})", self.index),
        }
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("index", &self.index)
            .field("name", &self.cached_name())
            .finish()
    }
}
