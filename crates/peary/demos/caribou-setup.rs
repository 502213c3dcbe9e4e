//! Power up a Caribou board through a peary daemon.
//!
//! ```text
//! cargo run -p peary --example caribou-setup -- --host daq-01 --vdda 1.2
//! ```

mod logging;

use std::process::ExitCode;

use clap::Parser;
use peary::device::{CaribouBoard, CurrentBiasName, PowerSupplyName, VoltageBiasName};
use peary::transport::DEFAULT_PORT;
use peary::{with_client, ClientConfig, DeviceClass};
use tracing::{error, info};

use crate::logging::LogArgs;

const DEVICE_TYPE: &str = "SpacelyCaribouBasic";

#[derive(Parser, Debug)]
#[command(name = "caribou-setup", about = "Configure and power a Caribou board")]
struct Args {
    /// Daemon host.
    #[arg(long, env = "PEARY_HOST", default_value = "localhost")]
    host: String,

    /// Daemon port.
    #[arg(long, env = "PEARY_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Load connection settings from a JSON file; overrides --host and --port.
    #[arg(long, value_name = "PATH")]
    config: Option<std::path::PathBuf>,

    #[arg(long, default_value_t = 1.2)]
    vdda: f64,

    #[arg(long, default_value_t = 1.0)]
    vddd: f64,

    /// CMOS logic level, also used for the I/O supply.
    #[arg(long, default_value_t = 1.8)]
    vddio: f64,

    #[arg(long, default_value_t = 0.4)]
    vbias: f64,

    #[arg(long, default_value_t = 0.001)]
    ibias: f64,

    #[command(flatten)]
    log: LogArgs,
}

fn load_config(args: &Args) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    match &args.config {
        Some(path) => Ok(ClientConfig::from_json(&std::fs::read_to_string(path)?)?),
        None => Ok(ClientConfig::new(args.host.clone(), args.port)),
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args)?;

    with_client(&config, |proxy| {
        let board = proxy.add_device_as::<CaribouBoard>(DEVICE_TYPE)?;
        info!(device = %board.device(), "board bound");

        board.set_logic_level(args.vddio)?;

        let vdda = board.power_supply(PowerSupplyName::PwrOut1);
        let vddd = board.power_supply(PowerSupplyName::PwrOut2);
        let vddio = board.power_supply(PowerSupplyName::PwrOut3);
        let vbias = board.voltage_bias(VoltageBiasName::Bias1);
        let ibias = board.current_bias(CurrentBiasName::Cur1);

        vdda.set_voltage(args.vdda)?;
        vddd.set_voltage(args.vddd)?;
        vddio.set_voltage(args.vddio)?;
        vbias.set_voltage(args.vbias)?;
        ibias.set_current(args.ibias)?;

        for rail in [vdda, vddd, vddio] {
            rail.switch_on()?;
        }
        vbias.switch_on()?;
        ibias.switch_on()?;

        for supply in [vdda, vddd, vddio] {
            let volts = supply.get_voltage()?;
            info!(supply = supply.name(), volts, "supply measured");
        }
        Ok(())
    })?;

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    args.log.init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "setup failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
