//! DTLS record framing.
//!
//! ```text
//! struct {
//!     ContentType type;          // 1 byte
//!     ProtocolVersion version;   // 2 bytes
//!     uint16 epoch;
//!     uint48 sequence_number;
//!     uint16 length;
//!     opaque payload[length];
//! } DTLSPlaintext;
//! ```

use wiretls_core::codec::{self, Codec};
use wiretls_core::error::Result;
use wiretls_core::version::WireVersion;

use crate::alert::Alert;
use crate::change_cipher_spec::ChangeCipherSpec;
use crate::handshake::DtlsHandshake;
use crate::heartbeat::Heartbeat;
use crate::record::ContentType;

/// One message carried in a DTLS record.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DtlsMessage {
    ChangeCipherSpec(ChangeCipherSpec),
    Alert(Alert),
    Handshake(DtlsHandshake),
    ApplicationData(Vec<u8>),
    Heartbeat(Heartbeat),
    Opaque {
        content_type: ContentType,
        data: Vec<u8>,
    },
}

impl DtlsMessage {
    pub fn content_type(&self) -> ContentType {
        match self {
            DtlsMessage::ChangeCipherSpec(_) => ContentType::ChangeCipherSpec,
            DtlsMessage::Alert(_) => ContentType::Alert,
            DtlsMessage::Handshake(_) => ContentType::Handshake,
            DtlsMessage::ApplicationData(_) => ContentType::ApplicationData,
            DtlsMessage::Heartbeat(_) => ContentType::Heartbeat,
            DtlsMessage::Opaque { content_type, .. } => *content_type,
        }
    }

    /// Parse one message of the given content type, returning the rest of
    /// the input. Complete handshake messages get their body decoded;
    /// fragments stay opaque for the reassembler.
    pub fn read(content_type: ContentType, data: &[u8]) -> Result<(Self, &[u8])> {
        match content_type {
            ContentType::ChangeCipherSpec => {
                let (ccs, rest) = ChangeCipherSpec::read(data)?;
                Ok((DtlsMessage::ChangeCipherSpec(ccs), rest))
            }
            ContentType::Alert => {
                let (alert, rest) = Alert::read(data)?;
                Ok((DtlsMessage::Alert(alert), rest))
            }
            ContentType::Handshake => {
                let (handshake, rest) = DtlsHandshake::read(data)?;
                Ok((DtlsMessage::Handshake(handshake), rest))
            }
            ContentType::ApplicationData => Ok((
                DtlsMessage::ApplicationData(data.to_vec()),
                &data[data.len()..],
            )),
            ContentType::Heartbeat => {
                let (heartbeat, rest) = Heartbeat::read(data)?;
                Ok((DtlsMessage::Heartbeat(heartbeat), rest))
            }
            ContentType::Unknown(_) => Ok((
                DtlsMessage::Opaque {
                    content_type,
                    data: data.to_vec(),
                },
                &data[data.len()..],
            )),
        }
    }

    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            DtlsMessage::ChangeCipherSpec(ccs) => ccs.write(out),
            DtlsMessage::Alert(alert) => alert.write(out),
            DtlsMessage::Handshake(handshake) => handshake.write(out),
            DtlsMessage::ApplicationData(data) => {
                out.extend_from_slice(data);
                Ok(())
            }
            DtlsMessage::Heartbeat(heartbeat) => heartbeat.write(out),
            DtlsMessage::Opaque { data, .. } => {
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
pub enum DtlsRecordPayload {
    Raw(Vec<u8>),
    Messages(Vec<DtlsMessage>),
}

impl DtlsRecordPayload {
    pub fn raw(&self) -> Option<&[u8]> {
        match self {
            DtlsRecordPayload::Raw(data) => Some(data),
            DtlsRecordPayload::Messages(_) => None,
        }
    }
}

/// A DTLS record.
///
/// `length` reflects the last decoded wire value; encoding recomputes it
/// from the payload.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DtlsRecord {
    pub content_type: ContentType,
    pub version: WireVersion,
    pub epoch: u16,
    pub sequence_number: u64,
    pub length: u16,
    pub payload: DtlsRecordPayload,
}

impl DtlsRecord {
    /// Frame one message into a record. Epoch and sequence number are
    /// assigned by the connection on send.
    pub fn single(version: WireVersion, message: DtlsMessage) -> Self {
        DtlsRecord {
            content_type: message.content_type(),
            version,
            epoch: 0,
            sequence_number: 0,
            length: 0,
            payload: DtlsRecordPayload::Messages(vec![message]),
        }
    }

    /// Parse the record header and raw payload, leaving the payload
    /// undecoded.
    pub fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (content_type, rest) = codec::read_u8(data, "record content_type")?;
        let (version, rest) = WireVersion::read(rest)?;
        let (epoch, rest) = codec::read_u16(rest, "epoch")?;
        let (sequence_number, rest) = codec::read_u48(rest, "sequence_number")?;
        let (length, rest) = codec::read_u16(rest, "record length")?;
        let (payload, rest) = codec::take(rest, length as usize, "record payload")?;
        Ok((
            DtlsRecord {
                content_type: ContentType::from_u8(content_type),
                version,
                epoch,
                sequence_number,
                length,
                payload: DtlsRecordPayload::Raw(payload.to_vec()),
            },
            rest,
        ))
    }

    /// Parse one record and decode its payload messages.
    pub fn decode(data: &[u8]) -> Result<(Self, &[u8])> {
        let (mut record, rest) = DtlsRecord::read(data)?;
        record.decode_payload()?;
        Ok((record, rest))
    }

    /// Decode a raw payload into its messages in place.
    pub fn decode_payload(&mut self) -> Result<()> {
        if let DtlsRecordPayload::Raw(data) = &self.payload {
            let mut messages = Vec::new();
            let mut rest: &[u8] = data;
            while !rest.is_empty() {
                let (message, remaining) = DtlsMessage::read(self.content_type, rest)?;
                messages.push(message);
                rest = remaining;
            }
            self.payload = DtlsRecordPayload::Messages(messages);
        }
        Ok(())
    }

    /// The first decoded message, for the common one-message case.
    pub fn message(&self) -> Option<&DtlsMessage> {
        match &self.payload {
            DtlsRecordPayload::Messages(messages) => messages.first(),
            DtlsRecordPayload::Raw(_) => None,
        }
    }

    fn payload_bytes(&self) -> Result<Vec<u8>> {
        match &self.payload {
            DtlsRecordPayload::Raw(data) => Ok(data.clone()),
            DtlsRecordPayload::Messages(messages) => {
                let mut out = Vec::new();
                for message in messages {
                    message.write(&mut out)?;
                }
                Ok(out)
            }
        }
    }
}

impl Codec for DtlsRecord {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let payload = self.payload_bytes()?;
        out.push(self.content_type.as_u8());
        self.version.write(out)?;
        codec::put_u16(out, self.epoch);
        codec::put_u48(out, self.sequence_number, "sequence_number")?;
        codec::put_opaque16(out, &payload, "record length")?;
        Ok(())
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        DtlsRecord::read(data)
    }
}
