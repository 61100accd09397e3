//! Protocol version identifiers and their wire mapping.
//!
//! Record headers carry the version as a `(major, minor)` byte pair. DTLS
//! uses the ones-complement style encoding: 1.0 is `(254, 255)` and 1.2 is
//! `(254, 253)`.

use std::fmt;

use crate::codec::{self, Codec};
use crate::error::Result;

/// Internal identifier for the supported protocol profiles.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    SSLv2,
    SSLv3,
    TLSv10,
    TLSv11,
    TLSv12,
    DTLSv10,
    DTLSv12,
}

impl ProtocolVersion {
    /// All supported versions, stream profiles first.
    pub const ALL: [ProtocolVersion; 7] = [
        ProtocolVersion::SSLv2,
        ProtocolVersion::SSLv3,
        ProtocolVersion::TLSv10,
        ProtocolVersion::TLSv11,
        ProtocolVersion::TLSv12,
        ProtocolVersion::DTLSv10,
        ProtocolVersion::DTLSv12,
    ];

    /// Wire `(major, minor)` pair of this version.
    pub fn wire(self) -> (u8, u8) {
        match self {
            ProtocolVersion::SSLv2 => (0, 2),
            ProtocolVersion::SSLv3 => (3, 0),
            ProtocolVersion::TLSv10 => (3, 1),
            ProtocolVersion::TLSv11 => (3, 2),
            ProtocolVersion::TLSv12 => (3, 3),
            ProtocolVersion::DTLSv10 => (254, 255),
            ProtocolVersion::DTLSv12 => (254, 253),
        }
    }

    /// Look up the version matching a wire `(major, minor)` pair.
    pub fn from_wire(major: u8, minor: u8) -> Option<Self> {
        match (major, minor) {
            (0, 2) => Some(ProtocolVersion::SSLv2),
            (3, 0) => Some(ProtocolVersion::SSLv3),
            (3, 1) => Some(ProtocolVersion::TLSv10),
            (3, 2) => Some(ProtocolVersion::TLSv11),
            (3, 3) => Some(ProtocolVersion::TLSv12),
            (254, 255) => Some(ProtocolVersion::DTLSv10),
            (254, 253) => Some(ProtocolVersion::DTLSv12),
            _ => None,
        }
    }

    /// Human readable name.
    pub fn name(self) -> &'static str {
        match self {
            ProtocolVersion::SSLv2 => "SSLv2",
            ProtocolVersion::SSLv3 => "SSLv3",
            ProtocolVersion::TLSv10 => "TLS 1.0",
            ProtocolVersion::TLSv11 => "TLS 1.1",
            ProtocolVersion::TLSv12 => "TLS 1.2",
            ProtocolVersion::DTLSv10 => "DTLS 1.0",
            ProtocolVersion::DTLSv12 => "DTLS 1.2",
        }
    }

    /// True for the datagram profiles.
    pub fn is_dtls(self) -> bool {
        matches!(self, ProtocolVersion::DTLSv10 | ProtocolVersion::DTLSv12)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw `(major, minor)` version bytes as carried inside records and hello
/// messages. Kept verbatim so that unknown pairs still round-trip.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireVersion {
    pub major: u8,
    pub minor: u8,
}

impl WireVersion {
    pub fn new(major: u8, minor: u8) -> Self {
        WireVersion { major, minor }
    }

    /// The registered version these bytes identify, if any.
    pub fn protocol_version(self) -> Option<ProtocolVersion> {
        ProtocolVersion::from_wire(self.major, self.minor)
    }
}

impl Default for WireVersion {
    fn default() -> Self {
        WireVersion { major: 3, minor: 0 }
    }
}

impl From<ProtocolVersion> for WireVersion {
    fn from(version: ProtocolVersion) -> Self {
        let (major, minor) = version.wire();
        WireVersion { major, minor }
    }
}

impl fmt::Display for WireVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.protocol_version() {
            Some(version) => f.write_str(version.name()),
            None => write!(f, "({}, {})", self.major, self.minor),
        }
    }
}

impl Codec for WireVersion {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        out.push(self.major);
        out.push(self.minor);
        Ok(())
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (head, rest) = codec::take(data, 2, "version")?;
        Ok((
            WireVersion {
                major: head[0],
                minor: head[1],
            },
            rest,
        ))
    }
}

/// Look up the internal version for a wire `(major, minor)` pair.
pub fn get_version_by_version_id(major: u8, minor: u8) -> Option<ProtocolVersion> {
    ProtocolVersion::from_wire(major, minor)
}

/// Human readable name of an internal version.
pub fn get_version_name(version: ProtocolVersion) -> &'static str {
    version.name()
}

/// Wire `(major, minor)` pair of an internal version.
pub fn get_tls_version(version: ProtocolVersion) -> (u8, u8) {
    version.wire()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_is_bijective() {
        for version in ProtocolVersion::ALL {
            let (major, minor) = version.wire();
            assert_eq!(ProtocolVersion::from_wire(major, minor), Some(version));
        }
    }

    #[test]
    fn test_dtls_complement_form() {
        assert_eq!(ProtocolVersion::DTLSv10.wire(), (254, 255));
        assert_eq!(ProtocolVersion::DTLSv12.wire(), (254, 253));
        assert!(ProtocolVersion::DTLSv10.is_dtls());
        assert!(!ProtocolVersion::TLSv12.is_dtls());
    }

    #[test]
    fn test_unknown_pair() {
        assert_eq!(ProtocolVersion::from_wire(3, 4), None);
        assert_eq!(get_version_by_version_id(9, 9), None);
    }

    #[test]
    fn test_wire_version_codec() {
        let (version, rest) = WireVersion::read(&[0xfe, 0xff, 0xaa]).unwrap();
        assert_eq!(version, WireVersion::new(254, 255));
        assert_eq!(rest, &[0xaa]);
        assert_eq!(version.to_bytes().unwrap(), vec![0xfe, 0xff]);
        assert_eq!(version.protocol_version(), Some(ProtocolVersion::DTLSv10));
    }

    #[test]
    fn test_helpers() {
        assert_eq!(get_version_name(ProtocolVersion::SSLv3), "SSLv3");
        assert_eq!(get_tls_version(ProtocolVersion::TLSv12), (3, 3));
        assert_eq!(
            get_version_by_version_id(3, 1),
            Some(ProtocolVersion::TLSv10)
        );
    }
}
