//! Handshake protocol framing.
//!
//! Stream profile:
//!
//! ```text
//! struct {
//!     HandshakeType msg_type;    // 1 byte
//!     uint24 length;             // 3 bytes
//!     opaque body[length];
//! } Handshake;
//! ```
//!
//! DTLS adds fragmentation metadata to the header:
//!
//! ```text
//! struct {
//!     HandshakeType msg_type;    // 1 byte
//!     uint24 length;             // 3 bytes
//!     uint16 message_seq;
//!     uint24 fragment_offset;
//!     uint24 fragment_length;
//!     opaque body[fragment_length];
//! } DTLSHandshake;
//! ```
//!
//! A DTLS handshake is a fragment unless `fragment_offset` is zero and
//! `fragment_length` equals `length`.

mod certificate;
mod hello;
mod sslv2;

use std::collections::HashMap;

pub use certificate::{Certificate, ServerCertificate};
pub use hello::{ClientHello, DtlsClientHello, HelloVerifyRequest, ServerHello};
pub use sslv2::{Ssl2ClientHello, Ssl2ServerHello};

use wiretls_core::codec::{self, Codec};
use wiretls_core::error::{CodecError, Result};

use crate::registry::{self, HandshakeBodyDecoder, PayloadParent};

/// Handshake message type discriminant. Unknown values are preserved.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandshakeType {
    HelloRequest,
    ClientHello,
    ServerHello,
    /// DTLS only.
    HelloVerifyRequest,
    Certificate,
    ServerKeyExchange,
    CertificateRequest,
    ServerHelloDone,
    CertificateVerify,
    ClientKeyExchange,
    Finished,
    Unknown(u8),
}

impl HandshakeType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => HandshakeType::HelloRequest,
            1 => HandshakeType::ClientHello,
            2 => HandshakeType::ServerHello,
            3 => HandshakeType::HelloVerifyRequest,
            11 => HandshakeType::Certificate,
            12 => HandshakeType::ServerKeyExchange,
            13 => HandshakeType::CertificateRequest,
            14 => HandshakeType::ServerHelloDone,
            15 => HandshakeType::CertificateVerify,
            16 => HandshakeType::ClientKeyExchange,
            20 => HandshakeType::Finished,
            other => HandshakeType::Unknown(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            HandshakeType::HelloRequest => 0,
            HandshakeType::ClientHello => 1,
            HandshakeType::ServerHello => 2,
            HandshakeType::HelloVerifyRequest => 3,
            HandshakeType::Certificate => 11,
            HandshakeType::ServerKeyExchange => 12,
            HandshakeType::CertificateRequest => 13,
            HandshakeType::ServerHelloDone => 14,
            HandshakeType::CertificateVerify => 15,
            HandshakeType::ClientKeyExchange => 16,
            HandshakeType::Finished => 20,
            HandshakeType::Unknown(other) => other,
        }
    }

    pub fn name(self) -> Option<&'static str> {
        match self {
            HandshakeType::HelloRequest => Some("hello_request"),
            HandshakeType::ClientHello => Some("client_hello"),
            HandshakeType::ServerHello => Some("server_hello"),
            HandshakeType::HelloVerifyRequest => Some("hello_verify_request"),
            HandshakeType::Certificate => Some("certificate"),
            HandshakeType::ServerKeyExchange => Some("server_key_exchange"),
            HandshakeType::CertificateRequest => Some("certificate_request"),
            HandshakeType::ServerHelloDone => Some("server_hello_done"),
            HandshakeType::CertificateVerify => Some("certificate_verify"),
            HandshakeType::ClientKeyExchange => Some("client_key_exchange"),
            HandshakeType::Finished => Some("finished"),
            HandshakeType::Unknown(_) => None,
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        let value = match name {
            "hello_request" => HandshakeType::HelloRequest,
            "client_hello" => HandshakeType::ClientHello,
            "server_hello" => HandshakeType::ServerHello,
            "hello_verify_request" => HandshakeType::HelloVerifyRequest,
            "certificate" => HandshakeType::Certificate,
            "server_key_exchange" => HandshakeType::ServerKeyExchange,
            "certificate_request" => HandshakeType::CertificateRequest,
            "server_hello_done" => HandshakeType::ServerHelloDone,
            "certificate_verify" => HandshakeType::CertificateVerify,
            "client_key_exchange" => HandshakeType::ClientKeyExchange,
            "finished" => HandshakeType::Finished,
            _ => {
                return Err(CodecError::InvalidEnumName {
                    field: "handshake type",
                    name: name.to_string(),
                })
            }
        };
        Ok(value)
    }
}

/// Decoded body of a handshake message.
///
/// Key exchange bodies depend on the negotiated cipher, which the codec
/// does not track, so they stay opaque. Types without a registered grammar
/// land in `Opaque` and round-trip verbatim.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeBody {
    HelloRequest,
    ClientHello(ClientHello),
    DtlsClientHello(DtlsClientHello),
    ServerHello(ServerHello),
    HelloVerifyRequest(HelloVerifyRequest),
    Certificate(ServerCertificate),
    ServerKeyExchange(Vec<u8>),
    CertificateRequest(Vec<u8>),
    ServerHelloDone,
    CertificateVerify(Vec<u8>),
    ClientKeyExchange(Vec<u8>),
    Finished(Vec<u8>),
    Opaque(Vec<u8>),
}

impl HandshakeBody {
    /// The message type this body is carried under, when it implies one.
    pub fn handshake_type(&self) -> Option<HandshakeType> {
        match self {
            HandshakeBody::HelloRequest => Some(HandshakeType::HelloRequest),
            HandshakeBody::ClientHello(_) | HandshakeBody::DtlsClientHello(_) => {
                Some(HandshakeType::ClientHello)
            }
            HandshakeBody::ServerHello(_) => Some(HandshakeType::ServerHello),
            HandshakeBody::HelloVerifyRequest(_) => Some(HandshakeType::HelloVerifyRequest),
            HandshakeBody::Certificate(_) => Some(HandshakeType::Certificate),
            HandshakeBody::ServerKeyExchange(_) => Some(HandshakeType::ServerKeyExchange),
            HandshakeBody::CertificateRequest(_) => Some(HandshakeType::CertificateRequest),
            HandshakeBody::ServerHelloDone => Some(HandshakeType::ServerHelloDone),
            HandshakeBody::CertificateVerify(_) => Some(HandshakeType::CertificateVerify),
            HandshakeBody::ClientKeyExchange(_) => Some(HandshakeType::ClientKeyExchange),
            HandshakeBody::Finished(_) => Some(HandshakeType::Finished),
            HandshakeBody::Opaque(_) => None,
        }
    }

    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            HandshakeBody::HelloRequest | HandshakeBody::ServerHelloDone => Ok(()),
            HandshakeBody::ClientHello(hello) => hello.write(out),
            HandshakeBody::DtlsClientHello(hello) => hello.write(out),
            HandshakeBody::ServerHello(hello) => hello.write(out),
            HandshakeBody::HelloVerifyRequest(verify) => verify.write(out),
            HandshakeBody::Certificate(certificate) => certificate.write(out),
            HandshakeBody::ServerKeyExchange(data)
            | HandshakeBody::CertificateRequest(data)
            | HandshakeBody::CertificateVerify(data)
            | HandshakeBody::ClientKeyExchange(data)
            | HandshakeBody::Finished(data)
            | HandshakeBody::Opaque(data) => {
                out.extend_from_slice(data);
                Ok(())
            }
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write(&mut out)?;
        Ok(out)
    }

    /// Raw fragment bytes, when this body has not been decoded yet.
    pub fn opaque_bytes(&self) -> Option<&[u8]> {
        match self {
            HandshakeBody::Opaque(data) => Some(data),
            _ => None,
        }
    }
}

/// Run a registered body decoder over a complete slab, turning a premature
/// end of slab into a framing error.
fn decode_body_slab(
    parent: PayloadParent,
    msg_type: u8,
    slab: &[u8],
) -> Result<HandshakeBody> {
    match registry::handshake_decoder(parent, msg_type) {
        Some(decode) => decode(slab).map_err(|err| match err {
            CodecError::NotEnoughData(_) => CodecError::MalformedVector {
                field: "handshake body",
                reason: "truncated inner grammar",
            },
            other => other,
        }),
        None => Ok(HandshakeBody::Opaque(slab.to_vec())),
    }
}

/// A stream (SSLv3/TLS) handshake message.
///
/// `length` reflects the last decoded wire value; encoding recomputes it
/// from the body.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub msg_type: HandshakeType,
    pub length: u32,
    pub body: HandshakeBody,
}

impl Handshake {
    /// Wrap a typed body; the message type is taken from the body itself.
    pub fn new(body: HandshakeBody) -> Option<Self> {
        let msg_type = body.handshake_type()?;
        Some(Handshake {
            msg_type,
            length: 0,
            body,
        })
    }

    /// Wrap raw bytes under an explicit message type.
    pub fn opaque(msg_type: HandshakeType, data: Vec<u8>) -> Self {
        Handshake {
            msg_type,
            length: 0,
            body: HandshakeBody::Opaque(data),
        }
    }
}

impl Codec for Handshake {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let body = self.body.to_bytes()?;
        out.push(self.msg_type.as_u8());
        codec::put_u24(out, body.len() as u32, "handshake length")?;
        out.extend_from_slice(&body);
        Ok(())
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (msg_type, rest) = codec::read_u8(data, "handshake type")?;
        let (length, rest) = codec::read_u24(rest, "handshake length")?;
        let (slab, rest) = codec::take(rest, length as usize, "handshake body")?;
        let body = decode_body_slab(PayloadParent::Handshake, msg_type, slab)?;
        Ok((
            Handshake {
                msg_type: HandshakeType::from_u8(msg_type),
                length,
                body,
            },
            rest,
        ))
    }
}

/// A DTLS handshake message or fragment.
///
/// Fragments keep their body opaque; `decode_body` resolves the typed body
/// once the message is complete. `length` and the fragment fields reflect
/// the last decoded wire values; encoding a complete message recomputes
/// them from the body, while a fragment is re-emitted verbatim.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DtlsHandshake {
    pub msg_type: HandshakeType,
    pub length: u32,
    pub message_seq: u16,
    pub fragment_offset: u32,
    pub fragment_length: u32,
    pub body: HandshakeBody,
}

impl DtlsHandshake {
    /// Wrap a typed body; the message type is taken from the body itself.
    /// Sequence and fragment fields are assigned by the connection on send.
    pub fn new(body: HandshakeBody) -> Option<Self> {
        let msg_type = body.handshake_type()?;
        Some(DtlsHandshake {
            msg_type,
            length: 0,
            message_seq: 0,
            fragment_offset: 0,
            fragment_length: 0,
            body,
        })
    }

    /// True when this carries only a slice of the full message.
    pub fn is_fragment(&self) -> bool {
        self.fragment_offset != 0 || self.fragment_length != self.length
    }

    /// Parse header and fragment bytes without touching the body grammar.
    pub fn read_fragment(data: &[u8]) -> Result<(Self, &[u8])> {
        let (msg_type, rest) = codec::read_u8(data, "handshake type")?;
        let (length, rest) = codec::read_u24(rest, "handshake length")?;
        let (message_seq, rest) = codec::read_u16(rest, "message_seq")?;
        let (fragment_offset, rest) = codec::read_u24(rest, "fragment_offset")?;
        let (fragment_length, rest) = codec::read_u24(rest, "fragment_length")?;
        let (slab, rest) = codec::take(rest, fragment_length as usize, "handshake fragment")?;
        Ok((
            DtlsHandshake {
                msg_type: HandshakeType::from_u8(msg_type),
                length,
                message_seq,
                fragment_offset,
                fragment_length,
                body: HandshakeBody::Opaque(slab.to_vec()),
            },
            rest,
        ))
    }

    /// Resolve the typed body of a complete message. Fragments and already
    /// decoded messages are left alone.
    pub fn decode_body(&mut self) -> Result<()> {
        if self.is_fragment() {
            return Ok(());
        }
        if let HandshakeBody::Opaque(bytes) = &self.body {
            let decoded =
                decode_body_slab(PayloadParent::DtlsHandshake, self.msg_type.as_u8(), bytes)?;
            self.body = decoded;
        }
        Ok(())
    }

    /// Absorb another fragment of the same message when its byte range
    /// overlaps or abuts this one. Returns true when `other` is spent,
    /// either merged in or fully covered already.
    pub fn merge(&mut self, other: &DtlsHandshake) -> bool {
        let new = match other.body.opaque_bytes() {
            Some(bytes) => bytes,
            None => return false,
        };
        let HandshakeBody::Opaque(cur) = &mut self.body else {
            return false;
        };
        let start = self.fragment_offset as usize;
        let end = start + cur.len();
        let other_start = other.fragment_offset as usize;
        let other_end = other_start + new.len();

        if other_end < start || other_start > end {
            return false;
        }
        if other_start < start {
            // Extends to the left; keep only the part before our range.
            let mut merged = Vec::with_capacity((start - other_start) + cur.len());
            merged.extend_from_slice(&new[..start - other_start]);
            merged.extend_from_slice(cur);
            *cur = merged;
            self.fragment_offset = other.fragment_offset;
            self.fragment_length = cur.len() as u32;
            return true;
        }
        if other_end > end {
            // Extends to the right.
            cur.extend_from_slice(&new[end - other_start..]);
            self.fragment_length = cur.len() as u32;
            return true;
        }
        // Fully covered by what we already have.
        true
    }
}

impl Codec for DtlsHandshake {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let body = self.body.to_bytes()?;
        let (length, fragment_offset, fragment_length) = if self.is_fragment() {
            (self.length, self.fragment_offset, self.fragment_length)
        } else {
            (body.len() as u32, 0, body.len() as u32)
        };
        out.push(self.msg_type.as_u8());
        codec::put_u24(out, length, "handshake length")?;
        codec::put_u16(out, self.message_seq);
        codec::put_u24(out, fragment_offset, "fragment_offset")?;
        codec::put_u24(out, fragment_length, "fragment_length")?;
        out.extend_from_slice(&body);
        Ok(())
    }

    /// Parse one message, resolving the body grammar when it is complete.
    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (mut handshake, rest) = DtlsHandshake::read_fragment(data)?;
        handshake.decode_body()?;
        Ok((handshake, rest))
    }
}

// Body decoders installed into the registry at startup.

fn exact<T: Codec>(data: &[u8], field: &'static str) -> Result<T> {
    let (value, rest) = T::read(data)?;
    codec::expect_empty(rest, field)?;
    Ok(value)
}

fn decode_hello_request(data: &[u8]) -> Result<HandshakeBody> {
    codec::expect_empty(data, "hello_request")?;
    Ok(HandshakeBody::HelloRequest)
}

fn decode_client_hello(data: &[u8]) -> Result<HandshakeBody> {
    Ok(HandshakeBody::ClientHello(exact(data, "client_hello")?))
}

fn decode_dtls_client_hello(data: &[u8]) -> Result<HandshakeBody> {
    Ok(HandshakeBody::DtlsClientHello(exact(data, "client_hello")?))
}

fn decode_server_hello(data: &[u8]) -> Result<HandshakeBody> {
    Ok(HandshakeBody::ServerHello(exact(data, "server_hello")?))
}

fn decode_hello_verify_request(data: &[u8]) -> Result<HandshakeBody> {
    Ok(HandshakeBody::HelloVerifyRequest(exact(
        data,
        "hello_verify_request",
    )?))
}

fn decode_certificate(data: &[u8]) -> Result<HandshakeBody> {
    Ok(HandshakeBody::Certificate(exact(data, "certificate")?))
}

fn decode_server_key_exchange(data: &[u8]) -> Result<HandshakeBody> {
    Ok(HandshakeBody::ServerKeyExchange(data.to_vec()))
}

fn decode_certificate_request(data: &[u8]) -> Result<HandshakeBody> {
    Ok(HandshakeBody::CertificateRequest(data.to_vec()))
}

fn decode_server_hello_done(data: &[u8]) -> Result<HandshakeBody> {
    codec::expect_empty(data, "server_hello_done")?;
    Ok(HandshakeBody::ServerHelloDone)
}

fn decode_certificate_verify(data: &[u8]) -> Result<HandshakeBody> {
    Ok(HandshakeBody::CertificateVerify(data.to_vec()))
}

fn decode_client_key_exchange(data: &[u8]) -> Result<HandshakeBody> {
    Ok(HandshakeBody::ClientKeyExchange(data.to_vec()))
}

fn decode_finished(data: &[u8]) -> Result<HandshakeBody> {
    Ok(HandshakeBody::Finished(data.to_vec()))
}

pub(crate) fn builtin_decoders() -> HashMap<(PayloadParent, u8), HandshakeBodyDecoder> {
    let mut map: HashMap<(PayloadParent, u8), HandshakeBodyDecoder> = HashMap::new();

    let shared: [(u8, HandshakeBodyDecoder); 8] = [
        (0, decode_hello_request),
        (2, decode_server_hello),
        (11, decode_certificate),
        (12, decode_server_key_exchange),
        (13, decode_certificate_request),
        (14, decode_server_hello_done),
        (15, decode_certificate_verify),
        (20, decode_finished),
    ];
    for (msg_type, decoder) in shared {
        map.insert((PayloadParent::Handshake, msg_type), decoder);
        map.insert((PayloadParent::DtlsHandshake, msg_type), decoder);
    }

    map.insert((PayloadParent::Handshake, 1), decode_client_hello);
    map.insert((PayloadParent::Handshake, 16), decode_client_key_exchange);

    map.insert((PayloadParent::DtlsHandshake, 1), decode_dtls_client_hello);
    map.insert((PayloadParent::DtlsHandshake, 3), decode_hello_verify_request);
    map.insert((PayloadParent::DtlsHandshake, 16), decode_client_key_exchange);

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_round_trip() {
        for value in [0u8, 1, 2, 3, 11, 12, 13, 14, 15, 16, 20, 99] {
            assert_eq!(HandshakeType::from_u8(value).as_u8(), value);
        }
        assert_eq!(HandshakeType::from_u8(99), HandshakeType::Unknown(99));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(
            HandshakeType::from_name("client_hello").unwrap(),
            HandshakeType::ClientHello
        );
        assert!(matches!(
            HandshakeType::from_name("bogus"),
            Err(CodecError::InvalidEnumName { .. })
        ));
    }

    #[test]
    fn test_server_hello_done_frame() {
        // Type 14, length 0
        let data = [0x0e, 0x00, 0x00, 0x00];
        let (handshake, rest) = Handshake::read(&data).unwrap();
        assert!(rest.is_empty());
        assert_eq!(handshake.msg_type, HandshakeType::ServerHelloDone);
        assert_eq!(handshake.length, 0);
        assert_eq!(handshake.body, HandshakeBody::ServerHelloDone);
        assert_eq!(handshake.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_partial_header_is_retryable() {
        let err = Handshake::read(&[0x01, 0x00]).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_partial_body_is_retryable() {
        // Claims 16 body bytes, provides 3
        let err = Handshake::read(&[0x01, 0x00, 0x00, 0x10, 0xaa, 0xbb, 0xcc]).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_unknown_type_stays_opaque() {
        let data = [0x63, 0x00, 0x00, 0x02, 0xaa, 0xbb];
        let (handshake, _) = Handshake::read(&data).unwrap();
        assert_eq!(handshake.msg_type, HandshakeType::Unknown(0x63));
        assert_eq!(handshake.body, HandshakeBody::Opaque(vec![0xaa, 0xbb]));
        assert_eq!(handshake.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_dtls_fragment_header() {
        // Type 11, length 684, seq 2, offset 0, fragment_length 4 (a fragment)
        let mut data = vec![0x0b, 0x00, 0x02, 0xac, 0x00, 0x02, 0x00, 0x00, 0x00];
        data.extend_from_slice(&[0x00, 0x00, 0x04]);
        data.extend_from_slice(&[1, 2, 3, 4]);

        let (fragment, rest) = DtlsHandshake::read_fragment(&data).unwrap();
        assert!(rest.is_empty());
        assert!(fragment.is_fragment());
        assert_eq!(fragment.length, 684);
        assert_eq!(fragment.message_seq, 2);
        assert_eq!(fragment.body, HandshakeBody::Opaque(vec![1, 2, 3, 4]));
        // Fragments re-encode verbatim.
        assert_eq!(fragment.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_merge_left_right_and_covered() {
        let make = |offset: u32, bytes: &[u8]| DtlsHandshake {
            msg_type: HandshakeType::Certificate,
            length: 9,
            message_seq: 0,
            fragment_offset: offset,
            fragment_length: bytes.len() as u32,
            body: HandshakeBody::Opaque(bytes.to_vec()),
        };

        let mut mid = make(3, &[3, 4, 5]);
        // Disjoint on the right.
        assert!(!mid.merge(&make(7, &[7, 8])));
        // Abuts on the right.
        assert!(mid.merge(&make(6, &[6, 7, 8])));
        assert_eq!(mid.fragment_offset, 3);
        assert_eq!(mid.fragment_length, 6);
        // Overlaps on the left.
        assert!(mid.merge(&make(0, &[0, 1, 2, 3])));
        assert_eq!(mid.fragment_offset, 0);
        assert_eq!(mid.fragment_length, 9);
        // Fully covered duplicate.
        assert!(mid.merge(&make(2, &[2, 3])));
        assert_eq!(mid.fragment_length, 9);
        assert!(!mid.is_fragment());
        assert_eq!(
            mid.body,
            HandshakeBody::Opaque(vec![0, 1, 2, 3, 4, 5, 6, 7, 8])
        );
    }
}
