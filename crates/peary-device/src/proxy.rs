use std::any::{type_name, Any};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use bytes::Bytes;
use peary_session::{command, ProtocolHandle};
use tracing::{debug, info};

use crate::device::{Device, DeviceClass};
use crate::error::{DeviceError, RegistryError, Result};

struct Registered {
    device: Rc<Device>,
    class: Rc<dyn Any>,
}

/// Client-side view of the devices on a peary daemon.
///
/// Devices can be addressed two ways: by a name chosen when adding them, or
/// directly by the index the daemon assigned. Either way a device handle is
/// created once per index and shared by every later lookup.
pub struct Proxy {
    protocol: ProtocolHandle,
    named: HashMap<String, Registered>,
    indexed: BTreeMap<u32, Rc<Device>>,
}

impl Proxy {
    /// Create a proxy over a connected protocol.
    pub fn new(protocol: ProtocolHandle) -> Self {
        Self {
            protocol,
            named: HashMap::new(),
            indexed: BTreeMap::new(),
        }
    }

    /// Send an empty command to check that the daemon still answers.
    pub fn keep_alive(&self) -> Result<Bytes> {
        self.request(command::KEEP_ALIVE, &[])
    }

    /// Create a device of type `name` on the daemon and register it as `name`.
    pub fn add_device(&mut self, name: &str) -> Result<Rc<Device>> {
        self.ensure_unregistered(name)?;
        let device = self.create_remote(name)?;
        self.named.insert(
            name.to_string(),
            Registered {
                device: Rc::clone(&device),
                class: device.clone(),
            },
        );
        Ok(device)
    }

    /// Like [`Proxy::add_device`], wrapping the device in the class `T`.
    pub fn add_device_as<T: DeviceClass>(&mut self, name: &str) -> Result<Rc<T>> {
        self.ensure_unregistered(name)?;
        let device = self.create_remote(name)?;
        let typed = Rc::new(T::bind(Rc::clone(&device))?);
        self.named.insert(
            name.to_string(),
            Registered {
                device,
                class: typed.clone(),
            },
        );
        Ok(typed)
    }

    /// Look up a device registered under `name`.
    pub fn get_device(&self, name: &str) -> Result<Rc<Device>> {
        let entry = self.registered(name)?;
        Ok(Rc::clone(&entry.device))
    }

    /// Look up a device registered under `name` with class `T`.
    pub fn get_device_as<T: DeviceClass>(&self, name: &str) -> Result<Rc<T>> {
        let entry = self.registered(name)?;
        Rc::clone(&entry.class).downcast::<T>().map_err(|_| {
            RegistryError::ClassMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            }
            .into()
        })
    }

    /// Names of all locally registered devices, sorted.
    pub fn list_devices(&self) -> Vec<String> {
        let mut names: Vec<String> = self.named.keys().cloned().collect();
        names.sort();
        names
    }

    /// Close every device on the daemon and forget them locally.
    ///
    /// Local state is only cleared once the daemon has accepted the command.
    pub fn clear_devices(&mut self) -> Result<()> {
        self.request(command::CLEAR_DEVICES, &[])?;
        self.named.clear();
        self.indexed.clear();
        info!("cleared all devices");
        Ok(())
    }

    /// Raw listing of the devices known to the daemon.
    pub fn list_remote_devices(&self) -> Result<Bytes> {
        self.request(command::LIST_DEVICES, &[])
    }

    /// Indices of the devices known to the daemon, ascending.
    pub fn remote_device_indices(&self) -> Result<Vec<u32>> {
        let reply = self.list_remote_devices()?;
        let text = std::str::from_utf8(&reply).map_err(|_| DeviceError::InvalidUtf8 {
            command: command::LIST_DEVICES.to_string(),
        })?;

        let mut indices = text
            .split_whitespace()
            .map(|token| parse_index(command::LIST_DEVICES, token))
            .collect::<Result<Vec<_>>>()?;
        indices.sort_unstable();
        indices.dedup();
        Ok(indices)
    }

    /// The handle for the device at `index`, created on first use.
    pub fn device(&mut self, index: u32) -> Rc<Device> {
        let protocol = &self.protocol;
        let device = self
            .indexed
            .entry(index)
            .or_insert_with(|| Rc::new(Device::new(index, Rc::clone(protocol))));
        Rc::clone(device)
    }

    /// The lowest-indexed daemon device of type `device_type`, created if
    /// none exists yet.
    pub fn ensure_device(&mut self, device_type: &str) -> Result<Rc<Device>> {
        for index in self.remote_device_indices()? {
            let device = self.device(index);
            if device.name()? == device_type {
                debug!(index, device_type, "found existing device");
                return Ok(device);
            }
        }
        self.create_remote(device_type)
    }

    fn request(&self, command: &str, args: &[&str]) -> Result<Bytes> {
        let reply = self.protocol.borrow_mut().request(command, args)?;
        Ok(reply)
    }

    fn create_remote(&mut self, device_type: &str) -> Result<Rc<Device>> {
        let reply = self.request(command::ADD_DEVICE, &[device_type])?;
        let text = std::str::from_utf8(&reply).map_err(|_| DeviceError::InvalidUtf8 {
            command: command::ADD_DEVICE.to_string(),
        })?;
        let index = parse_index(command::ADD_DEVICE, text)?;
        info!(index, device_type, "added device");
        Ok(self.device(index))
    }

    fn ensure_unregistered(&self, name: &str) -> Result<()> {
        if self.named.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_string()).into());
        }
        Ok(())
    }

    fn registered(&self, name: &str) -> Result<&Registered> {
        self.named
            .get(name)
            .ok_or_else(|| RegistryError::UnknownName(name.to_string()).into())
    }
}

impl std::fmt::Debug for Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proxy")
            .field("devices", &self.list_devices())
            .field("indices", &self.indexed.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn parse_index(command: &str, text: &str) -> Result<u32> {
    text.trim().parse().map_err(|err: std::num::ParseIntError| DeviceError::Parse {
        command: command.to_string(),
        value: text.to_string(),
        reason: err.to_string(),
    })
}
