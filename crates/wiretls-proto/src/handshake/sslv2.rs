//! SSLv2 hello messages.
//!
//! SSLv2 puts all section lengths up front and concatenates the section
//! bodies after them. Cipher kinds are 24-bit identifiers.
//!
//! ```text
//! struct {
//!     ProtocolVersion version;
//!     uint16 cipher_suites_length;
//!     uint16 session_id_length;
//!     uint16 challenge_length;
//!     opaque cipher_suites[cipher_suites_length];
//!     opaque session_id[session_id_length];
//!     opaque challenge[challenge_length];
//! } SSLv2ClientHello;
//! ```

use wiretls_core::codec::{self, Codec};
use wiretls_core::error::{CodecError, Result};
use wiretls_core::version::WireVersion;

fn read_cipher_kinds(slab: &[u8]) -> Result<Vec<u32>> {
    if slab.len() % 3 != 0 {
        return Err(CodecError::MalformedVector {
            field: "cipher_suites",
            reason: "cipher kind shorter than 3 bytes",
        });
    }
    let mut kinds = Vec::with_capacity(slab.len() / 3);
    let mut rest = slab;
    while !rest.is_empty() {
        let (kind, remaining) = codec::read_u24(rest, "cipher_suites")?;
        kinds.push(kind);
        rest = remaining;
    }
    Ok(kinds)
}

fn write_cipher_kinds(kinds: &[u32]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(kinds.len() * 3);
    for kind in kinds {
        codec::put_u24(&mut out, *kind, "cipher_suites")?;
    }
    Ok(out)
}

fn put_section_length(out: &mut Vec<u8>, len: usize, field: &'static str) -> Result<()> {
    if len > u16::MAX as usize {
        return Err(CodecError::OverflowingLengthField {
            field,
            value: len as u64,
            width: 16,
        });
    }
    codec::put_u16(out, len as u16);
    Ok(())
}

/// SSLv2 ClientHello; only valid inside an SSLv2 record.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ssl2ClientHello {
    pub version: WireVersion,
    pub cipher_suites: Vec<u32>,
    pub session_id: Vec<u8>,
    pub challenge: Vec<u8>,
}

impl Ssl2ClientHello {
    /// A fresh hello with a 16-byte challenge and no session to resume.
    pub fn new(cipher_suites: Vec<u32>) -> Self {
        Ssl2ClientHello {
            version: WireVersion::new(0, 2),
            cipher_suites,
            session_id: Vec::new(),
            challenge: codec::random_bytes(16),
        }
    }
}

impl Codec for Ssl2ClientHello {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let cipher_data = write_cipher_kinds(&self.cipher_suites)?;
        self.version.write(out)?;
        put_section_length(out, cipher_data.len(), "cipher_suites_length")?;
        put_section_length(out, self.session_id.len(), "session_id_length")?;
        put_section_length(out, self.challenge.len(), "challenge_length")?;
        out.extend_from_slice(&cipher_data);
        out.extend_from_slice(&self.session_id);
        out.extend_from_slice(&self.challenge);
        Ok(())
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (version, rest) = WireVersion::read(data)?;
        let (cipher_suites_length, rest) = codec::read_u16(rest, "cipher_suites_length")?;
        let (session_id_length, rest) = codec::read_u16(rest, "session_id_length")?;
        let (challenge_length, rest) = codec::read_u16(rest, "challenge_length")?;
        let (cipher_data, rest) = codec::take(rest, cipher_suites_length as usize, "cipher_suites")?;
        let (session_id, rest) = codec::take(rest, session_id_length as usize, "session_id")?;
        let (challenge, rest) = codec::take(rest, challenge_length as usize, "challenge")?;
        Ok((
            Ssl2ClientHello {
                version,
                cipher_suites: read_cipher_kinds(cipher_data)?,
                session_id: session_id.to_vec(),
                challenge: challenge.to_vec(),
            },
            rest,
        ))
    }
}

/// SSLv2 ServerHello.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ssl2ServerHello {
    pub session_id_hit: u8,
    pub certificate_type: u8,
    pub version: WireVersion,
    pub certificate: Vec<u8>,
    pub cipher_suites: Vec<u32>,
    pub connection_id: Vec<u8>,
}

impl Codec for Ssl2ServerHello {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let cipher_data = write_cipher_kinds(&self.cipher_suites)?;
        out.push(self.session_id_hit);
        out.push(self.certificate_type);
        self.version.write(out)?;
        put_section_length(out, self.certificate.len(), "certificate_length")?;
        put_section_length(out, cipher_data.len(), "cipher_suites_length")?;
        put_section_length(out, self.connection_id.len(), "connection_id_length")?;
        out.extend_from_slice(&self.certificate);
        out.extend_from_slice(&cipher_data);
        out.extend_from_slice(&self.connection_id);
        Ok(())
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (session_id_hit, rest) = codec::read_u8(data, "session_id_hit")?;
        let (certificate_type, rest) = codec::read_u8(rest, "certificate_type")?;
        let (version, rest) = WireVersion::read(rest)?;
        let (certificate_length, rest) = codec::read_u16(rest, "certificate_length")?;
        let (cipher_suites_length, rest) = codec::read_u16(rest, "cipher_suites_length")?;
        let (connection_id_length, rest) = codec::read_u16(rest, "connection_id_length")?;
        let (certificate, rest) = codec::take(rest, certificate_length as usize, "certificate")?;
        let (cipher_data, rest) = codec::take(rest, cipher_suites_length as usize, "cipher_suites")?;
        let (connection_id, rest) =
            codec::take(rest, connection_id_length as usize, "connection_id")?;
        Ok((
            Ssl2ServerHello {
                session_id_hit,
                certificate_type,
                version,
                certificate: certificate.to_vec(),
                cipher_suites: read_cipher_kinds(cipher_data)?,
                connection_id: connection_id.to_vec(),
            },
            rest,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_hello_round_trip() {
        let hello = Ssl2ClientHello {
            version: WireVersion::new(0, 2),
            cipher_suites: vec![0x050080, 0x030080, 0x010080],
            session_id: Vec::new(),
            challenge: vec![0x44; 16],
        };
        let bytes = hello.to_bytes().unwrap();
        // version + three lengths + 3 cipher kinds + challenge
        assert_eq!(bytes.len(), 2 + 6 + 9 + 16);
        assert_eq!(&bytes[2..8], &[0x00, 0x09, 0x00, 0x00, 0x00, 0x10]);

        let (decoded, rest) = Ssl2ClientHello::read(&bytes).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, hello);
    }

    #[test]
    fn test_partial_cipher_kind() {
        let mut bytes = vec![0, 2];
        bytes.extend_from_slice(&[0x00, 0x02, 0x00, 0x00, 0x00, 0x00]);
        bytes.extend_from_slice(&[0x05, 0x00]);
        let err = Ssl2ClientHello::read(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::MalformedVector { .. }));
    }

    #[test]
    fn test_server_hello_round_trip() {
        let hello = Ssl2ServerHello {
            session_id_hit: 0,
            certificate_type: 1,
            version: WireVersion::new(0, 2),
            certificate: vec![0x30, 0x82, 0x03],
            cipher_suites: vec![0x0700c0],
            connection_id: vec![9; 16],
        };
        let bytes = hello.to_bytes().unwrap();
        let (decoded, rest) = Ssl2ServerHello::read(&bytes).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, hello);
    }
}
