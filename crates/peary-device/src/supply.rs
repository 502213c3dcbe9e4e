use std::ops::Deref;
use std::rc::Rc;

use bytes::Bytes;

use crate::device::Device;
use crate::error::Result;

/// A named output of a device's periphery.
#[derive(Debug, Clone)]
pub struct Supply {
    name: String,
    device: Rc<Device>,
}

impl Supply {
    /// Bind the port `name` of `device`.
    pub fn new(name: impl Into<String>, device: Rc<Device>) -> Self {
        Self {
            name: name.into(),
            device,
        }
    }

    /// The periphery port name sent to the daemon.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The device the supply belongs to.
    pub fn device(&self) -> &Rc<Device> {
        &self.device
    }
}

macro_rules! supply_kind {
    ($(#[$meta:meta])* $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $kind(Supply);

        impl $kind {
            /// Bind the port `name` of `device`.
            pub fn new(name: impl Into<String>, device: Rc<Device>) -> Self {
                Self(Supply::new(name, device))
            }
        }

        impl Deref for $kind {
            type Target = Supply;

            fn deref(&self) -> &Supply {
                &self.0
            }
        }
    };
}

macro_rules! voltage_control {
    ($kind:ident) => {
        impl $kind {
            /// Set the output voltage.
            pub fn set_voltage(&self, value: f64) -> Result<Bytes> {
                self.device.set_voltage(&self.name, value)
            }

            /// Measure the output voltage.
            pub fn get_voltage(&self) -> Result<f64> {
                self.device.get_voltage(&self.name)
            }
        }
    };
}

macro_rules! switch_control {
    ($kind:ident) => {
        impl $kind {
            /// Switch the output on.
            pub fn switch_on(&self) -> Result<Bytes> {
                self.device.switch_on(&self.name)
            }

            /// Switch the output off.
            pub fn switch_off(&self) -> Result<Bytes> {
                self.device.switch_off(&self.name)
            }
        }
    };
}

supply_kind! {
    /// A power supply output.
    PowerSupply
}
supply_kind! {
    /// A voltage bias output.
    VoltageBias
}
supply_kind! {
    /// A current bias output.
    CurrentBias
}

voltage_control!(PowerSupply);
voltage_control!(VoltageBias);
switch_control!(PowerSupply);
switch_control!(VoltageBias);
switch_control!(CurrentBias);

impl CurrentBias {
    /// Set the output current.
    pub fn set_current(&self, value: f64) -> Result<Bytes> {
        self.device.set_current(&self.name, value)
    }

    /// Measure the output current.
    pub fn get_current(&self) -> Result<f64> {
        self.device.get_current(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingProtocol, Reply};

    #[test]
    fn power_supply_targets_its_port() {
        let (handle, log) = RecordingProtocol::new()
            .on("device.get_voltage 2 PWR_OUT_1", Reply::Ok("1.19"))
            .into_handle();
        let device = Rc::new(Device::new(2, handle));
        let supply = PowerSupply::new("PWR_OUT_1", Rc::clone(&device));

        supply.set_voltage(1.2).unwrap();
        assert_eq!(supply.get_voltage().unwrap(), 1.19);
        supply.switch_on().unwrap();
        supply.switch_off().unwrap();
        assert_eq!(supply.name(), "PWR_OUT_1");
        assert!(Rc::ptr_eq(supply.device(), &device));
        assert_eq!(
            log.borrow().requests,
            [
                "device.set_voltage 2 PWR_OUT_1 1.2",
                "device.get_voltage 2 PWR_OUT_1",
                "device.switch_on 2 PWR_OUT_1",
                "device.switch_off 2 PWR_OUT_1",
            ]
        );
    }

    #[test]
    fn voltage_bias_switches() {
        let (handle, log) = RecordingProtocol::new().into_handle();
        let bias = VoltageBias::new("BIAS_3", Rc::new(Device::new(0, handle)));

        bias.set_voltage(0.4).unwrap();
        bias.switch_on().unwrap();
        bias.switch_off().unwrap();
        assert_eq!(
            log.borrow().requests,
            [
                "device.set_voltage 0 BIAS_3 0.4",
                "device.switch_on 0 BIAS_3",
                "device.switch_off 0 BIAS_3",
            ]
        );
    }

    #[test]
    fn current_bias_sets_current() {
        let (handle, log) = RecordingProtocol::new()
            .on("device.get_current 1 CUR_8", Reply::Ok("0.001\n"))
            .into_handle();
        let bias = CurrentBias::new("CUR_8", Rc::new(Device::new(1, handle)));

        bias.set_current(0.002).unwrap();
        assert_eq!(bias.get_current().unwrap(), 0.001);
        bias.switch_on().unwrap();
        assert_eq!(
            log.borrow().requests,
            [
                "device.set_current 1 CUR_8 0.002",
                "device.get_current 1 CUR_8",
                "device.switch_on 1 CUR_8",
            ]
        );
    }
}
