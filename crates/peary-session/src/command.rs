//! Command names understood by the daemon and the payload convention.

/// Query the daemon's protocol version.
pub const VERSION_QUERY: &str = "protocol_version";
/// Empty command used to test the connection.
pub const KEEP_ALIVE: &str = "";
/// Create a device of the named type; replies with its index.
pub const ADD_DEVICE: &str = "add_device";
/// List the indices of all devices known to the daemon.
pub const LIST_DEVICES: &str = "list_devices";
/// Close and forget every device on the daemon.
pub const CLEAR_DEVICES: &str = "clear_devices";
/// Prefix for commands addressed to a single device.
pub const DEVICE_PREFIX: &str = "device.";

/// Build the request payload: command and arguments joined by single spaces.
pub fn join_command(command: &str, args: &[&str]) -> String {
    let mut payload = String::with_capacity(
        command.len() + args.iter().map(|arg| arg.len() + 1).sum::<usize>(),
    );
    payload.push_str(command);
    for arg in args {
        payload.push(' ');
        payload.push_str(arg);
    }
    payload
}

/// Name of a device-scoped command, e.g. `device.get_voltage`.
pub fn device_command(command: &str) -> String {
    format!("{DEVICE_PREFIX}{command}")
}
