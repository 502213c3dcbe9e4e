use tracing::trace;

use crate::command;
use crate::error::{ProtocolError, Result};
use crate::session::Protocol;

/// Version token this client speaks.
pub const PROTOCOL_VERSION: &str = "1";

/// Ask the daemon for its protocol version and compare it with `expected`.
///
/// This is the first request on a fresh connection. Any reply other than
/// exactly `expected` aborts connection setup.
pub fn verify_version<P: Protocol + ?Sized>(protocol: &mut P, expected: &str) -> Result<()> {
    let version = protocol.request(command::VERSION_QUERY, &[])?;
    trace!(remote = %String::from_utf8_lossy(&version), "daemon protocol version");

    if version.as_ref() != expected.as_bytes() {
        return Err(ProtocolError::VersionMismatch {
            expected: expected.to_string(),
            received: String::from_utf8_lossy(&version).into_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    struct FixedVersion {
        reply: &'static [u8],
        commands: Vec<String>,
    }

    impl Protocol for FixedVersion {
        fn request(&mut self, command: &str, args: &[&str]) -> Result<Bytes> {
            self.commands.push(command::join_command(command, args));
            Ok(Bytes::from_static(self.reply))
        }
    }

    #[test]
    fn matching_version_passes() {
        let mut protocol = FixedVersion {
            reply: b"1",
            commands: Vec::new(),
        };
        verify_version(&mut protocol, PROTOCOL_VERSION).unwrap();
        assert_eq!(protocol.commands, ["protocol_version"]);
    }

    #[test]
    fn version_comparison_is_exact() {
        for reply in [&b"2"[..], &b"1 "[..], &b""[..], &b"10"[..]] {
            let mut protocol = FixedVersion {
                reply,
                commands: Vec::new(),
            };
            let err = verify_version(&mut protocol, PROTOCOL_VERSION).unwrap_err();
            assert!(matches!(err, ProtocolError::VersionMismatch { .. }));
        }
    }

    #[test]
    fn mismatch_reports_received_version() {
        let mut protocol = FixedVersion {
            reply: b"2",
            commands: Vec::new(),
        };
        let err = verify_version(&mut protocol, PROTOCOL_VERSION).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported protocol version '2' (expected '1')"
        );
    }
}
