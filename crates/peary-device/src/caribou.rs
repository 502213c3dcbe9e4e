//! Caribou carrier board.
//!
//! ```no_run
//! # fn demo(proxy: &mut peary_device::Proxy) -> peary_device::Result<()> {
//! use peary_device::{CaribouBoard, PowerSupplyName};
//!
//! let board = proxy.add_device_as::<CaribouBoard>("SpacelyCaribouBasic")?;
//! board.set_logic_level(1.8)?;
//! let vdda = board.power_supply(PowerSupplyName::PwrOut1);
//! vdda.set_voltage(1.2)?;
//! vdda.switch_on()?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use bytes::Bytes;
use tracing::debug;

use crate::device::{Device, DeviceClass};
use crate::error::Result;
use crate::supply::{CurrentBias, PowerSupply, VoltageBias};

/// I2C address of the PCA9539 port expander driving the supply enables.
const PCA9539_ADDRESS: u8 = 0x76;

macro_rules! port_names {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The port name understood by the daemon.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

port_names! {
    /// Power supply outputs of the board.
    PowerSupplyName {
        PwrOut1 => "PWR_OUT_1",
        PwrOut2 => "PWR_OUT_2",
        PwrOut3 => "PWR_OUT_3",
        PwrOut4 => "PWR_OUT_4",
        PwrOut5 => "PWR_OUT_5",
        PwrOut6 => "PWR_OUT_6",
        PwrOut7 => "PWR_OUT_7",
        PwrOut8 => "PWR_OUT_8",
    }
}

// TODO: the board has 32 voltage biases; only the first five are exposed.
port_names! {
    /// Voltage bias outputs of the board.
    VoltageBiasName {
        Bias1 => "BIAS_1",
        Bias2 => "BIAS_2",
        Bias3 => "BIAS_3",
        Bias4 => "BIAS_4",
        Bias5 => "BIAS_5",
    }
}

port_names! {
    /// Current bias outputs of the board.
    CurrentBiasName {
        Cur1 => "CUR_1",
        Cur2 => "CUR_2",
        Cur3 => "CUR_3",
        Cur4 => "CUR_4",
        Cur5 => "CUR_5",
        Cur6 => "CUR_6",
        Cur7 => "CUR_7",
        Cur8 => "CUR_8",
    }
}

/// I2C buses of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum I2cBus {
    Bus0 = 0,
    Bus1 = 1,
    Bus2 = 2,
    Bus3 = 3,
}

impl I2cBus {
    pub fn number(self) -> u8 {
        self as u8
    }
}

/// A Caribou carrier board attached to the daemon.
///
/// Binding the board enables the outputs of its port expander, so supplies
/// are usable as soon as [`CaribouBoard::bind`] returns.
#[derive(Debug)]
pub struct CaribouBoard {
    device: Rc<Device>,
    power_supplies: Vec<PowerSupply>,
    voltage_biases: Vec<VoltageBias>,
    current_biases: Vec<CurrentBias>,
}

impl CaribouBoard {
    /// The handle of one power supply output.
    pub fn power_supply(&self, name: PowerSupplyName) -> &PowerSupply {
        &self.power_supplies[name as usize]
    }

    /// The handle of one voltage bias output.
    pub fn voltage_bias(&self, name: VoltageBiasName) -> &VoltageBias {
        &self.voltage_biases[name as usize]
    }

    /// The handle of one current bias output.
    pub fn current_bias(&self, name: CurrentBiasName) -> &CurrentBias {
        &self.current_biases[name as usize]
    }

    /// Set both the input and the output CMOS logic level.
    pub fn set_logic_level(&self, value: f64) -> Result<()> {
        let level = value.to_string();
        self.device.request("setInputCMOSLevel", &[&level])?;
        self.device.request("setOutputCMOSLevel", &[&level])?;
        Ok(())
    }

    /// Write one byte to `addr` of the I2C component `comp`.
    pub fn write_i2c(&self, bus: I2cBus, comp: u8, addr: u8, data: u8) -> Result<Bytes> {
        self.device.request(
            "car_i2c_write",
            &[
                &bus.number().to_string(),
                &comp.to_string(),
                &addr.to_string(),
                &data.to_string(),
            ],
        )
    }

    /// Read `length` bytes from `addr` of the I2C component `comp`.
    pub fn read_i2c(&self, bus: I2cBus, comp: u8, addr: u8, length: usize) -> Result<Bytes> {
        self.device.request(
            "car_i2c_read",
            &[
                &bus.number().to_string(),
                &comp.to_string(),
                &addr.to_string(),
                &length.to_string(),
            ],
        )
    }
}

impl DeviceClass for CaribouBoard {
    fn bind(device: Rc<Device>) -> Result<Self> {
        let board = Self {
            power_supplies: PowerSupplyName::ALL
                .iter()
                .map(|name| PowerSupply::new(name.as_str(), Rc::clone(&device)))
                .collect(),
            voltage_biases: VoltageBiasName::ALL
                .iter()
                .map(|name| VoltageBias::new(name.as_str(), Rc::clone(&device)))
                .collect(),
            current_biases: CurrentBiasName::ALL
                .iter()
                .map(|name| CurrentBias::new(name.as_str(), Rc::clone(&device)))
                .collect(),
            device,
        };

        // Register 6 drives the supply output-enable lines, register 7 enables
        // the supplies themselves.
        board.write_i2c(I2cBus::Bus0, PCA9539_ADDRESS, 6, 0)?;
        board.write_i2c(I2cBus::Bus0, PCA9539_ADDRESS, 7, 0)?;
        debug!(index = board.device.index(), "caribou board supplies enabled");
        Ok(board)
    }

    fn device(&self) -> &Rc<Device> {
        &self.device
    }
}

impl Deref for CaribouBoard {
    type Target = Device;

    fn deref(&self) -> &Device {
        &self.device
    }
}
