//! SSLv3/TLS record framing.
//!
//! ```text
//! struct {
//!     ContentType type;          // 1 byte
//!     ProtocolVersion version;   // 2 bytes
//!     uint16 length;
//!     opaque payload[length];
//! } TLSPlaintext;
//! ```

use wiretls_core::codec::{self, Codec};
use wiretls_core::error::Result;
use wiretls_core::version::WireVersion;

use crate::alert::Alert;
use crate::change_cipher_spec::ChangeCipherSpec;
use crate::handshake::Handshake;
use crate::heartbeat::Heartbeat;
use crate::record::ContentType;

/// One message carried in a stream record, typed by the record content
/// type. A single record may carry several messages of the same type, and
/// one handshake message may span several records; the stream assembler in
/// the connection layer undoes both.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMessage {
    ChangeCipherSpec(ChangeCipherSpec),
    Alert(Alert),
    Handshake(Handshake),
    ApplicationData(Vec<u8>),
    Heartbeat(Heartbeat),
    Opaque {
        content_type: ContentType,
        data: Vec<u8>,
    },
}

impl TlsMessage {
    pub fn content_type(&self) -> ContentType {
        match self {
            TlsMessage::ChangeCipherSpec(_) => ContentType::ChangeCipherSpec,
            TlsMessage::Alert(_) => ContentType::Alert,
            TlsMessage::Handshake(_) => ContentType::Handshake,
            TlsMessage::ApplicationData(_) => ContentType::ApplicationData,
            TlsMessage::Heartbeat(_) => ContentType::Heartbeat,
            TlsMessage::Opaque { content_type, .. } => *content_type,
        }
    }

    /// Parse one message of the given content type, returning the rest of
    /// the input.
    pub fn read(content_type: ContentType, data: &[u8]) -> Result<(Self, &[u8])> {
        match content_type {
            ContentType::ChangeCipherSpec => {
                let (ccs, rest) = ChangeCipherSpec::read(data)?;
                Ok((TlsMessage::ChangeCipherSpec(ccs), rest))
            }
            ContentType::Alert => {
                let (alert, rest) = Alert::read(data)?;
                Ok((TlsMessage::Alert(alert), rest))
            }
            ContentType::Handshake => {
                let (handshake, rest) = Handshake::read(data)?;
                Ok((TlsMessage::Handshake(handshake), rest))
            }
            ContentType::ApplicationData => {
                Ok((TlsMessage::ApplicationData(data.to_vec()), &data[data.len()..]))
            }
            ContentType::Heartbeat => {
                let (heartbeat, rest) = Heartbeat::read(data)?;
                Ok((TlsMessage::Heartbeat(heartbeat), rest))
            }
            ContentType::Unknown(_) => Ok((
                TlsMessage::Opaque {
                    content_type,
                    data: data.to_vec(),
                },
                &data[data.len()..],
            )),
        }
    }

    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            TlsMessage::ChangeCipherSpec(ccs) => ccs.write(out),
            TlsMessage::Alert(alert) => alert.write(out),
            TlsMessage::Handshake(handshake) => handshake.write(out),
            TlsMessage::ApplicationData(data) => {
                out.extend_from_slice(data);
                Ok(())
            }
            TlsMessage::Heartbeat(heartbeat) => heartbeat.write(out),
            TlsMessage::Opaque { data, .. } => {
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
}

/// Record payload in raw or decoded form.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsRecordPayload {
    Raw(Vec<u8>),
    Messages(Vec<TlsMessage>),
}

impl TlsRecordPayload {
    pub fn raw(&self) -> Option<&[u8]> {
        match self {
            TlsRecordPayload::Raw(data) => Some(data),
            TlsRecordPayload::Messages(_) => None,
        }
    }
}

/// An SSLv3/TLS record.
///
/// `length` reflects the last decoded wire value; encoding recomputes it
/// from the payload.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsRecord {
    pub content_type: ContentType,
    pub version: WireVersion,
    pub length: u16,
    pub payload: TlsRecordPayload,
}

impl TlsRecord {
    /// Frame one message into a record.
    pub fn single(version: WireVersion, message: TlsMessage) -> Self {
        TlsRecord {
            content_type: message.content_type(),
            version,
            length: 0,
            payload: TlsRecordPayload::Messages(vec![message]),
        }
    }

    /// Parse the record header and raw payload, leaving the payload
    /// undecoded.
    pub fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (content_type, rest) = codec::read_u8(data, "record content_type")?;
        let (version, rest) = WireVersion::read(rest)?;
        let (length, rest) = codec::read_u16(rest, "record length")?;
        let (payload, rest) = codec::take(rest, length as usize, "record payload")?;
        Ok((
            TlsRecord {
                content_type: ContentType::from_u8(content_type),
                version,
                length,
                payload: TlsRecordPayload::Raw(payload.to_vec()),
            },
            rest,
        ))
    }

    /// Parse one record and decode its payload messages.
    pub fn decode(data: &[u8]) -> Result<(Self, &[u8])> {
        let (mut record, rest) = TlsRecord::read(data)?;
        record.decode_payload()?;
        Ok((record, rest))
    }

    /// Decode a raw payload into its messages in place.
    pub fn decode_payload(&mut self) -> Result<()> {
        if let TlsRecordPayload::Raw(data) = &self.payload {
            let mut messages = Vec::new();
            let mut rest: &[u8] = data;
            while !rest.is_empty() {
                let (message, remaining) = TlsMessage::read(self.content_type, rest)?;
                messages.push(message);
                rest = remaining;
            }
            self.payload = TlsRecordPayload::Messages(messages);
        }
        Ok(())
    }

    /// The first decoded message, for the common one-message case.
    pub fn message(&self) -> Option<&TlsMessage> {
        match &self.payload {
            TlsRecordPayload::Messages(messages) => messages.first(),
            TlsRecordPayload::Raw(_) => None,
        }
    }

    fn payload_bytes(&self) -> Result<Vec<u8>> {
        match &self.payload {
            TlsRecordPayload::Raw(data) => Ok(data.clone()),
            TlsRecordPayload::Messages(messages) => {
                let mut out = Vec::new();
                for message in messages {
                    message.write(&mut out)?;
                }
                Ok(out)
            }
        }
    }
}

impl Codec for TlsRecord {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let payload = self.payload_bytes()?;
        out.push(self.content_type.as_u8());
        self.version.write(out)?;
        codec::put_opaque16(out, &payload, "record length")?;
        Ok(())
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        TlsRecord::read(data)
    }
}
