use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use bytes::BytesMut;
use peary::device::{CaribouBoard, DeviceError, PowerSupplyName};
use peary::frame::{decode_frame, encode_frame, STATUS_OK};
use peary::session::ProtocolError;
use peary::{with_client, Client, ClientConfig, Error};

type Handler = fn(&str) -> (u16, String);

/// Accepts one connection and answers every request through `handler` until
/// the client hangs up. Returns the request payloads it saw.
fn spawn_daemon(handler: Handler) -> (u16, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("loopback bind should succeed");
    let port = listener.local_addr().expect("listener has an address").port();

    let daemon = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("client should connect");
        let mut seen = Vec::new();
        while let Some((tag, payload)) = read_request(&mut stream) {
            let (status, reply) = handler(&payload);
            seen.push(payload);

            let mut wire = BytesMut::new();
            encode_frame(reply.as_bytes(), tag, status, &mut wire).expect("reply should encode");
            if stream.write_all(&wire).is_err() {
                break;
            }
        }
        seen
    });
    (port, daemon)
}

fn read_request(stream: &mut TcpStream) -> Option<(u16, String)> {
    let mut prefix = [0u8; 4];
    stream.read_exact(&mut prefix).ok()?;
    let mut rest = vec![0u8; u32::from_be_bytes(prefix) as usize];
    stream.read_exact(&mut rest).ok()?;

    let mut data = prefix.to_vec();
    data.extend_from_slice(&rest);
    let frame = decode_frame(&data).expect("request should decode");
    let payload = String::from_utf8(frame.payload.to_vec()).expect("request should be text");
    Some((frame.tag, payload))
}

fn lab_daemon(payload: &str) -> (u16, String) {
    let mut words = payload.split(' ');
    let reply = match words.next().unwrap_or_default() {
        "protocol_version" => "1",
        "add_device" => match words.next() {
            Some("SpacelyCaribouBasic") => "1",
            _ => "0",
        },
        "list_devices" => "0 1",
        "device.name" => match words.next() {
            Some("1") => "SpacelyCaribouBasic",
            _ => "Example",
        },
        "device.get_voltage" => "1.2",
        "device.broken" => return (4, "not implemented".to_string()),
        _ => "",
    };
    (STATUS_OK, reply.to_string())
}

fn future_daemon(payload: &str) -> (u16, String) {
    match payload {
        "protocol_version" => (STATUS_OK, "2".to_string()),
        _ => (STATUS_OK, String::new()),
    }
}

#[test]
fn connect_handshake_then_drive_device() {
    let (port, daemon) = spawn_daemon(lab_daemon);

    let mut client = Client::connect("127.0.0.1", port).expect("connect should succeed");
    let device = client.add_device("Example").expect("add_device should succeed");
    assert_eq!(device.index(), 0);
    device.power_on().expect("power_on should succeed");
    assert_eq!(device.get_voltage("PWR_OUT_1").unwrap(), 1.2);
    assert_eq!(device.name().unwrap(), "Example");
    assert_eq!(device.to_string(), "Example(0)");

    client.close().expect("close should succeed");
    assert!(client.is_closed());

    let seen = daemon.join().expect("daemon thread should finish");
    assert_eq!(
        seen,
        [
            "protocol_version",
            "add_device Example",
            "device.power_on 0",
            "device.get_voltage 0 PWR_OUT_1",
            "device.name 0",
        ]
    );
}

#[test]
fn unreachable_daemon_reports_host_and_port() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = Client::connect("127.0.0.1", port).unwrap_err();
    assert!(matches!(err, Error::Connect { .. }));
    assert_eq!(
        err.to_string(),
        format!("unable to connect to host 127.0.0.1 using port {port}")
    );
}

#[test]
fn incompatible_daemon_is_rejected() {
    let (port, daemon) = spawn_daemon(future_daemon);

    let err = Client::connect("127.0.0.1", port).unwrap_err();
    assert!(matches!(
        err,
        Error::Protocol(ProtocolError::VersionMismatch { .. })
    ));
    assert_eq!(daemon.join().unwrap(), ["protocol_version"]);
}

#[test]
fn version_check_can_be_disabled() {
    let (port, daemon) = spawn_daemon(future_daemon);

    let mut config = ClientConfig::new("127.0.0.1", port);
    config.check_version = false;
    let mut client = Client::connect_with_config(&config).expect("connect should succeed");
    client.keep_alive().expect("keep_alive should succeed");
    drop(client);

    assert_eq!(daemon.join().unwrap(), [""]);
}

#[test]
fn failed_status_leaves_connection_usable() {
    let (port, daemon) = spawn_daemon(lab_daemon);

    let mut client = Client::connect("127.0.0.1", port).unwrap();
    let device = client.device(0);
    let err = device.request("broken", &[]).unwrap_err();
    assert!(matches!(
        err,
        DeviceError::Protocol(ProtocolError::Status { status: 4, .. })
    ));
    assert!(!client.is_closed());

    device.reset().expect("session should survive a failed status");
    drop(device);
    drop(client);

    let seen = daemon.join().unwrap();
    assert_eq!(seen[1..], ["device.broken 0", "device.reset 0"]);
}

#[test]
fn ensure_device_reuses_existing_remote_device() {
    let (port, daemon) = spawn_daemon(lab_daemon);

    let mut client = Client::connect("127.0.0.1", port).unwrap();
    let device = client.ensure_device("SpacelyCaribouBasic").unwrap();
    assert_eq!(device.index(), 1);
    assert!(client.list_devices().is_empty());
    drop(device);
    drop(client);

    let seen = daemon.join().unwrap();
    assert_eq!(
        seen[1..],
        ["list_devices", "device.name 0", "device.name 1"]
    );
}

#[test]
fn with_client_binds_caribou_board_and_closes() {
    let (port, daemon) = spawn_daemon(lab_daemon);
    let config = ClientConfig::new("127.0.0.1", port);

    let volts = with_client(&config, |proxy| {
        let board = proxy.add_device_as::<CaribouBoard>("SpacelyCaribouBasic")?;
        board.set_logic_level(1.8)?;
        let vdda = board.power_supply(PowerSupplyName::PwrOut1);
        vdda.set_voltage(1.2)?;
        Ok(vdda.get_voltage()?)
    })
    .expect("setup should succeed");
    assert_eq!(volts, 1.2);

    // The daemon only returns once the client has hung up.
    let seen = daemon.join().unwrap();
    assert_eq!(
        seen,
        [
            "protocol_version",
            "add_device SpacelyCaribouBasic",
            "device.car_i2c_write 1 0 118 6 0",
            "device.car_i2c_write 1 0 118 7 0",
            "device.setInputCMOSLevel 1 1.8",
            "device.setOutputCMOSLevel 1 1.8",
            "device.set_voltage 1 PWR_OUT_1 1.2",
            "device.get_voltage 1 PWR_OUT_1",
        ]
    );
}

#[test]
fn with_client_closes_on_error() {
    let (port, daemon) = spawn_daemon(lab_daemon);
    let config = ClientConfig::new("127.0.0.1", port);

    let err = with_client(&config, |proxy| {
        proxy.get_device("missing")?;
        Ok(())
    })
    .unwrap_err();
    assert_eq!(err.to_string(), "Unknown device: missing");

    assert_eq!(daemon.join().unwrap(), ["protocol_version"]);
}

#[test]
fn clear_devices_forgets_registered_names() {
    let (port, daemon) = spawn_daemon(lab_daemon);

    let mut client = Client::connect("127.0.0.1", port).unwrap();
    client.add_device("Example").unwrap();
    assert_eq!(client.list_devices(), ["Example"]);
    client.clear_devices().unwrap();
    assert!(client.list_devices().is_empty());
    client.close().unwrap();

    let seen = daemon.join().unwrap();
    assert_eq!(seen.last().unwrap(), "clear_devices");
}
