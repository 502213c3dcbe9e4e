//! Remote device handles and the device registry.
//!
//! A [`Device`] is a thin handle around a daemon-assigned index: every method
//! becomes a `device.<command> <index> <args...>` request on the shared
//! protocol. The [`Proxy`] creates devices on the daemon and keeps track of
//! them by caller-chosen name and by index.

pub mod caribou;
pub mod device;
pub mod error;
pub mod proxy;
pub mod supply;

#[cfg(test)]
mod testing;

pub use caribou::{CaribouBoard, CurrentBiasName, I2cBus, PowerSupplyName, VoltageBiasName};
pub use device::{Device, DeviceClass};
pub use error::{DeviceError, RegistryError, Result};
pub use proxy::Proxy;
pub use supply::{CurrentBias, PowerSupply, Supply, VoltageBias};
