//! Handshake extension grammars.
//!
//! ```text
//! struct {
//!     ExtensionType extension_type;   // 2 bytes
//!     uint16 length;                  // 2 bytes
//!     opaque extension_data[length];
//! } Extension;
//! ```
//!
//! The body grammar is selected by `extension_type` through the process-wide
//! registry; types without a registered grammar stay opaque and round-trip
//! byte for byte.
//!
//! The extensions vector of a hello message is special: when a hello ends
//! right after the compression methods, the vector is absent. An empty list
//! therefore encodes to zero bytes, not to a zero length header.

use std::collections::HashMap;

use wiretls_core::codec::{self, Codec};
use wiretls_core::dicttls::extensions as ext_type;
use wiretls_core::error::{CodecError, Result};

use crate::registry::{self, ExtensionDecoder};

/// A single `(type, body)` extension entry.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub ext_type: u16,
    pub body: ExtensionBody,
}

impl Extension {
    pub fn new(ext_type: u16, body: ExtensionBody) -> Self {
        Extension { ext_type, body }
    }

    pub fn server_name(names: Vec<ServerName>) -> Self {
        Extension::new(ext_type::SERVER_NAME, ExtensionBody::ServerName(names))
    }

    pub fn elliptic_curves(curves: Vec<u16>) -> Self {
        Extension::new(ext_type::ELLIPTIC_CURVES, ExtensionBody::EllipticCurves(curves))
    }

    pub fn ec_point_formats(formats: Vec<u8>) -> Self {
        Extension::new(
            ext_type::EC_POINT_FORMATS,
            ExtensionBody::EcPointFormats(formats),
        )
    }

    pub fn signature_algorithms(algorithms: Vec<SignatureAndHashAlgorithm>) -> Self {
        Extension::new(
            ext_type::SIGNATURE_ALGORITHMS,
            ExtensionBody::SignatureAlgorithms(algorithms),
        )
    }

    pub fn heartbeat(mode: HeartbeatMode) -> Self {
        Extension::new(ext_type::HEARTBEAT, ExtensionBody::Heartbeat(mode))
    }

    pub fn alpn(protocols: Vec<ProtocolName>) -> Self {
        Extension::new(
            ext_type::APPLICATION_LAYER_PROTOCOL_NEGOTIATION,
            ExtensionBody::Alpn(protocols),
        )
    }

    pub fn session_ticket(ticket: Vec<u8>) -> Self {
        Extension::new(ext_type::SESSION_TICKET_TLS, ExtensionBody::SessionTicket(ticket))
    }

    pub fn next_protocol_negotiation(protocols: Vec<ProtocolName>) -> Self {
        Extension::new(
            ext_type::NEXT_PROTOCOL_NEGOTIATION,
            ExtensionBody::NextProtocolNegotiation(protocols),
        )
    }

    /// Registered name of this extension type.
    pub fn name(&self) -> Option<&'static str> {
        ext_type::extension_name(self.ext_type)
    }
}

impl Codec for Extension {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let body = self.body.to_bytes()?;
        codec::put_u16(out, self.ext_type);
        codec::put_opaque16(out, &body, "extension data")?;
        Ok(())
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (ext_type, rest) = codec::read_u16(data, "extension type")?;
        let (len, rest) = codec::read_u16(rest, "extension length")?;
        let (slab, rest) = codec::take(rest, len as usize, "extension data")?;
        let body = match registry::extension_decoder(ext_type) {
            // The slab is complete, so running out of bytes inside it is a
            // framing error rather than a retryable condition.
            Some(decode) => decode(slab).map_err(|err| match err {
                CodecError::NotEnoughData(_) => CodecError::MalformedVector {
                    field: "extension data",
                    reason: "truncated inner grammar",
                },
                other => other,
            })?,
            None => ExtensionBody::Opaque(slab.to_vec()),
        };
        Ok((Extension { ext_type, body }, rest))
    }
}

/// Decoded body of an extension.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionBody {
    /// server_name (0x0000). An empty list encodes to an empty body.
    ServerName(Vec<ServerName>),
    /// elliptic_curves (0x000a)
    EllipticCurves(Vec<u16>),
    /// ec_point_formats (0x000b)
    EcPointFormats(Vec<u8>),
    /// signature_algorithms (0x000d)
    SignatureAlgorithms(Vec<SignatureAndHashAlgorithm>),
    /// heartbeat (0x000f)
    Heartbeat(HeartbeatMode),
    /// application_layer_protocol_negotiation (0x0010)
    Alpn(Vec<ProtocolName>),
    /// session_ticket_tls (0x0023). An empty ticket encodes to an empty body.
    SessionTicket(Vec<u8>),
    /// next_protocol_negotiation (0x3374). Items pack until the end of the
    /// body with no outer length prefix.
    NextProtocolNegotiation(Vec<ProtocolName>),
    /// Any type without a registered grammar.
    Opaque(Vec<u8>),
}

impl ExtensionBody {
    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            ExtensionBody::ServerName(names) => {
                if names.is_empty() {
                    return Ok(());
                }
                codec::put_list16(out, names, "server_name_list")
            }
            ExtensionBody::EllipticCurves(curves) => {
                codec::put_list16(out, curves, "elliptic_curve_list")
            }
            ExtensionBody::EcPointFormats(formats) => {
                codec::put_list8(out, formats, "ec_point_format_list")
            }
            ExtensionBody::SignatureAlgorithms(algorithms) => {
                codec::put_list16(out, algorithms, "supported_signature_algorithms")
            }
            ExtensionBody::Heartbeat(mode) => {
                out.push(mode.0);
                Ok(())
            }
            ExtensionBody::Alpn(protocols) => {
                codec::put_list16(out, protocols, "protocol_name_list")
            }
            ExtensionBody::SessionTicket(ticket) => {
                if ticket.is_empty() {
                    return Ok(());
                }
                codec::put_opaque16(out, ticket, "session_ticket")
            }
            ExtensionBody::NextProtocolNegotiation(protocols) => {
                for protocol in protocols {
                    protocol.write(out)?;
                }
                Ok(())
            }
            ExtensionBody::Opaque(data) => {
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

    /// The extension type this body is conventionally carried under, when
    /// there is one.
    pub fn extension_type(&self) -> Option<u16> {
        match self {
            ExtensionBody::ServerName(_) => Some(ext_type::SERVER_NAME),
            ExtensionBody::EllipticCurves(_) => Some(ext_type::ELLIPTIC_CURVES),
            ExtensionBody::EcPointFormats(_) => Some(ext_type::EC_POINT_FORMATS),
            ExtensionBody::SignatureAlgorithms(_) => Some(ext_type::SIGNATURE_ALGORITHMS),
            ExtensionBody::Heartbeat(_) => Some(ext_type::HEARTBEAT),
            ExtensionBody::Alpn(_) => Some(ext_type::APPLICATION_LAYER_PROTOCOL_NEGOTIATION),
            ExtensionBody::SessionTicket(_) => Some(ext_type::SESSION_TICKET_TLS),
            ExtensionBody::NextProtocolNegotiation(_) => {
                Some(ext_type::NEXT_PROTOCOL_NEGOTIATION)
            }
            ExtensionBody::Opaque(_) => None,
        }
    }
}

/// One entry of a server_name list.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerName {
    /// name_type 0: a DNS host name.
    HostName(Vec<u8>),
    /// Any other name_type; the payload spans the rest of the entry.
    Unknown { name_type: u8, data: Vec<u8> },
}

impl ServerName {
    pub fn host_name(name: impl Into<Vec<u8>>) -> Self {
        ServerName::HostName(name.into())
    }
}

impl Codec for ServerName {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            ServerName::HostName(name) => {
                out.push(0);
                codec::put_opaque16(out, name, "host_name")
            }
            ServerName::Unknown { name_type, data } => {
                out.push(*name_type);
                out.extend_from_slice(data);
                Ok(())
            }
        }
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (name_type, rest) = codec::read_u8(data, "server name type")?;
        if name_type == 0 {
            let (name, rest) = codec::read_opaque16(rest, "host_name")?;
            Ok((ServerName::HostName(name), rest))
        } else {
            Ok((
                ServerName::Unknown {
                    name_type,
                    data: rest.to_vec(),
                },
                &rest[rest.len()..],
            ))
        }
    }
}

/// A `(hash, signature)` algorithm pair.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureAndHashAlgorithm {
    pub hash: u8,
    pub signature: u8,
}

impl SignatureAndHashAlgorithm {
    pub fn new(hash: u8, signature: u8) -> Self {
        SignatureAndHashAlgorithm { hash, signature }
    }
}

impl Codec for SignatureAndHashAlgorithm {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        out.push(self.hash);
        out.push(self.signature);
        Ok(())
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (hash, rest) = codec::read_u8(data, "hash algorithm")?;
        let (signature, rest) = codec::read_u8(rest, "signature algorithm")?;
        Ok((SignatureAndHashAlgorithm { hash, signature }, rest))
    }
}

/// A length-prefixed protocol name, as used by ALPN and NPN.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolName(pub Vec<u8>);

impl ProtocolName {
    pub fn new(name: impl Into<Vec<u8>>) -> Self {
        ProtocolName(name.into())
    }
}

impl Codec for ProtocolName {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        codec::put_opaque8(out, &self.0, "protocol name")
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (name, rest) = codec::read_opaque8(data, "protocol name")?;
        Ok((ProtocolName(name), rest))
    }
}

/// Heartbeat extension mode.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeartbeatMode(pub u8);

impl HeartbeatMode {
    pub const PEER_ALLOWED_TO_SEND: HeartbeatMode = HeartbeatMode(1);
    pub const PEER_NOT_ALLOWED_TO_SEND: HeartbeatMode = HeartbeatMode(2);

    pub fn name(self) -> Option<&'static str> {
        match self.0 {
            1 => Some("peer_allowed_to_send"),
            2 => Some("peer_not_allowed_to_send"),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "peer_allowed_to_send" => Ok(HeartbeatMode::PEER_ALLOWED_TO_SEND),
            "peer_not_allowed_to_send" => Ok(HeartbeatMode::PEER_NOT_ALLOWED_TO_SEND),
            _ => Err(CodecError::InvalidEnumName {
                field: "heartbeat mode",
                name: name.to_string(),
            }),
        }
    }
}

/// Read the extensions vector of a hello message. Zero remaining bytes mean
/// the vector is absent.
pub fn read_extensions(data: &[u8]) -> Result<(Vec<Extension>, &[u8])> {
    if data.is_empty() {
        return Ok((Vec::new(), data));
    }
    codec::read_list16::<Extension>(data, "extensions")
}

/// Write the extensions vector of a hello message. An empty list produces
/// zero bytes.
pub fn write_extensions(out: &mut Vec<u8>, extensions: &[Extension]) -> Result<()> {
    if extensions.is_empty() {
        return Ok(());
    }
    codec::put_list16(out, extensions, "extensions")
}

// Body decoders installed into the registry at startup.

fn decode_server_name(data: &[u8]) -> Result<ExtensionBody> {
    if data.is_empty() {
        return Ok(ExtensionBody::ServerName(Vec::new()));
    }
    let (names, rest) = codec::read_list16::<ServerName>(data, "server_name_list")?;
    codec::expect_empty(rest, "server_name_list")?;
    Ok(ExtensionBody::ServerName(names))
}

fn decode_elliptic_curves(data: &[u8]) -> Result<ExtensionBody> {
    let (curves, rest) = codec::read_list16::<u16>(data, "elliptic_curve_list")?;
    codec::expect_empty(rest, "elliptic_curve_list")?;
    Ok(ExtensionBody::EllipticCurves(curves))
}

fn decode_ec_point_formats(data: &[u8]) -> Result<ExtensionBody> {
    let (formats, rest) = codec::read_list8::<u8>(data, "ec_point_format_list")?;
    codec::expect_empty(rest, "ec_point_format_list")?;
    Ok(ExtensionBody::EcPointFormats(formats))
}

fn decode_signature_algorithms(data: &[u8]) -> Result<ExtensionBody> {
    let (algorithms, rest) =
        codec::read_list16::<SignatureAndHashAlgorithm>(data, "supported_signature_algorithms")?;
    codec::expect_empty(rest, "supported_signature_algorithms")?;
    Ok(ExtensionBody::SignatureAlgorithms(algorithms))
}

fn decode_heartbeat(data: &[u8]) -> Result<ExtensionBody> {
    let (mode, rest) = codec::read_u8(data, "heartbeat mode")?;
    codec::expect_empty(rest, "heartbeat mode")?;
    Ok(ExtensionBody::Heartbeat(HeartbeatMode(mode)))
}

fn decode_alpn(data: &[u8]) -> Result<ExtensionBody> {
    let (protocols, rest) = codec::read_list16::<ProtocolName>(data, "protocol_name_list")?;
    codec::expect_empty(rest, "protocol_name_list")?;
    Ok(ExtensionBody::Alpn(protocols))
}

fn decode_session_ticket(data: &[u8]) -> Result<ExtensionBody> {
    if data.is_empty() {
        return Ok(ExtensionBody::SessionTicket(Vec::new()));
    }
    let (ticket, rest) = codec::read_opaque16(data, "session_ticket")?;
    codec::expect_empty(rest, "session_ticket")?;
    Ok(ExtensionBody::SessionTicket(ticket))
}

fn decode_next_protocol_negotiation(data: &[u8]) -> Result<ExtensionBody> {
    let mut protocols = Vec::new();
    let mut rest = data;
    while !rest.is_empty() {
        let (protocol, remaining) = match ProtocolName::read(rest) {
            Ok(value) => value,
            Err(CodecError::NotEnoughData(_)) => {
                return Err(CodecError::MalformedVector {
                    field: "next_protocol_negotiation",
                    reason: "trailing partial item",
                });
            }
            Err(err) => return Err(err),
        };
        protocols.push(protocol);
        rest = remaining;
    }
    Ok(ExtensionBody::NextProtocolNegotiation(protocols))
}

pub(crate) fn builtin_decoders() -> HashMap<u16, ExtensionDecoder> {
    let mut map: HashMap<u16, ExtensionDecoder> = HashMap::new();
    map.insert(ext_type::SERVER_NAME, decode_server_name);
    map.insert(ext_type::ELLIPTIC_CURVES, decode_elliptic_curves);
    map.insert(ext_type::EC_POINT_FORMATS, decode_ec_point_formats);
    map.insert(ext_type::SIGNATURE_ALGORITHMS, decode_signature_algorithms);
    map.insert(ext_type::HEARTBEAT, decode_heartbeat);
    map.insert(
        ext_type::APPLICATION_LAYER_PROTOCOL_NEGOTIATION,
        decode_alpn,
    );
    map.insert(ext_type::SESSION_TICKET_TLS, decode_session_ticket);
    map.insert(
        ext_type::NEXT_PROTOCOL_NEGOTIATION,
        decode_next_protocol_negotiation,
    );
    map
}
