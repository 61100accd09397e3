//! SSLv2 record framing.
//!
//! The header comes in two shapes, selected by the high bit of the first
//! byte:
//!
//! ```text
//! 2-byte header (bit 7 set):    length = ((byte0 & 0x7f) << 8) | byte1
//! 3-byte header (bit 7 clear):  length = ((byte0 & 0x3f) << 8) | byte1
//!                               is_escape = byte0 & 0x40
//!                               padding_length = byte2
//! ```
//!
//! The declared length covers the message type byte, the payload and the
//! padding. Only the 3-byte form can carry padding.

use wiretls_core::codec::Codec;
use wiretls_core::error::{CodecError, Result};

use crate::handshake::{Ssl2ClientHello, Ssl2ServerHello};

/// SSLv2 message type values.
pub const SSL2_MT_CLIENT_HELLO: u8 = 1;
pub const SSL2_MT_SERVER_HELLO: u8 = 4;

/// One message carried in an SSLv2 record.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ssl2Message {
    ClientHello(Ssl2ClientHello),
    ServerHello(Ssl2ServerHello),
    Opaque(Vec<u8>),
}

impl Ssl2Message {
    pub fn msg_type(&self) -> Option<u8> {
        match self {
            Ssl2Message::ClientHello(_) => Some(SSL2_MT_CLIENT_HELLO),
            Ssl2Message::ServerHello(_) => Some(SSL2_MT_SERVER_HELLO),
            Ssl2Message::Opaque(_) => None,
        }
    }

    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Ssl2Message::ClientHello(hello) => hello.write(out),
            Ssl2Message::ServerHello(hello) => hello.write(out),
            Ssl2Message::Opaque(data) => {
                out.extend_from_slice(data);
                Ok(())
            }
        }
    }
}

/// Record payload in raw or decoded form.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ssl2RecordPayload {
    Raw(Vec<u8>),
    Message(Box<Ssl2Message>),
}

/// An SSLv2 record.
///
/// `length` reflects the last decoded wire value; encoding recomputes it.
/// The header shape on encode follows the padding: records without padding
/// use the 2-byte header, records with padding the 3-byte one.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ssl2Record {
    pub length: u16,
    pub is_escape: bool,
    pub padding: Vec<u8>,
    pub msg_type: u8,
    pub payload: Ssl2RecordPayload,
}

impl Ssl2Record {
    /// Frame one message into a record.
    pub fn single(message: Ssl2Message) -> Option<Self> {
        let msg_type = message.msg_type()?;
        Some(Ssl2Record {
            length: 0,
            is_escape: false,
            padding: Vec::new(),
            msg_type,
            payload: Ssl2RecordPayload::Message(Box::new(message)),
        })
    }

    /// Parse the record header and raw payload, leaving the payload
    /// undecoded.
    pub fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        if data.len() < 2 {
            return Err(CodecError::NotEnoughData("record header"));
        }
        let (length, is_escape, padding_length, header_len) = if data[0] & 0x80 != 0 {
            let length = (((data[0] & 0x7f) as u16) << 8) | data[1] as u16;
            (length, false, 0usize, 2usize)
        } else {
            if data.len() < 3 {
                return Err(CodecError::NotEnoughData("record header"));
            }
            let length = (((data[0] & 0x3f) as u16) << 8) | data[1] as u16;
            (length, data[0] & 0x40 != 0, data[2] as usize, 3usize)
        };

        let rest = &data[header_len..];
        if rest.len() < length as usize {
            return Err(CodecError::NotEnoughData("record payload"));
        }
        let (body, rest) = rest.split_at(length as usize);
        if body.is_empty() {
            return Err(CodecError::NotEnoughData("record type"));
        }
        if padding_length > body.len() - 1 {
            return Err(CodecError::MalformedVector {
                field: "record padding",
                reason: "padding length exceeds record body",
            });
        }
        let msg_type = body[0];
        let payload = body[1..body.len() - padding_length].to_vec();
        let padding = body[body.len() - padding_length..].to_vec();
        Ok((
            Ssl2Record {
                length,
                is_escape,
                padding,
                msg_type,
                payload: Ssl2RecordPayload::Raw(payload),
            },
            rest,
        ))
    }

    /// Parse one record and decode its payload message.
    pub fn decode(data: &[u8]) -> Result<(Self, &[u8])> {
        let (mut record, rest) = Ssl2Record::read(data)?;
        record.decode_payload()?;
        Ok((record, rest))
    }

    /// Decode a raw payload into its message in place.
    pub fn decode_payload(&mut self) -> Result<()> {
        let data = match &self.payload {
            Ssl2RecordPayload::Raw(data) => data,
            Ssl2RecordPayload::Message(_) => return Ok(()),
        };
        let message = match self.msg_type {
            SSL2_MT_CLIENT_HELLO => {
                let (hello, rest) = Ssl2ClientHello::read(data)?;
                wiretls_core::codec::expect_empty(rest, "client_hello")?;
                Ssl2Message::ClientHello(hello)
            }
            SSL2_MT_SERVER_HELLO => {
                let (hello, rest) = Ssl2ServerHello::read(data)?;
                wiretls_core::codec::expect_empty(rest, "server_hello")?;
                Ssl2Message::ServerHello(hello)
            }
            _ => Ssl2Message::Opaque(data.clone()),
        };
        self.payload = Ssl2RecordPayload::Message(Box::new(message));
        Ok(())
    }

    pub fn message(&self) -> Option<&Ssl2Message> {
        match &self.payload {
            Ssl2RecordPayload::Message(message) => Some(message),
            Ssl2RecordPayload::Raw(_) => None,
        }
    }

    fn payload_bytes(&self) -> Result<Vec<u8>> {
        match &self.payload {
            Ssl2RecordPayload::Raw(data) => Ok(data.clone()),
            Ssl2RecordPayload::Message(message) => {
                let mut out = Vec::new();
                message.write(&mut out)?;
                Ok(out)
            }
        }
    }
}

impl Codec for Ssl2Record {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let payload = self.payload_bytes()?;
        let length = 1 + payload.len() + self.padding.len();

        if self.padding.is_empty() {
            if length > 0x7fff {
                return Err(CodecError::OverflowingLengthField {
                    field: "record length",
                    value: length as u64,
                    width: 15,
                });
            }
            out.push(((length >> 8) as u8 & 0x7f) | 0x80);
            out.push(length as u8);
        } else {
            if length > 0x3fff {
                return Err(CodecError::OverflowingLengthField {
                    field: "record length",
                    value: length as u64,
                    width: 14,
                });
            }
            if self.padding.len() > u8::MAX as usize {
                return Err(CodecError::OverflowingLengthField {
                    field: "padding_length",
                    value: self.padding.len() as u64,
                    width: 8,
                });
            }
            let mut high = (length >> 8) as u8 & 0x3f;
            if self.is_escape {
                high |= 0x40;
            }
            out.push(high);
            out.push(length as u8);
            out.push(self.padding.len() as u8);
        }

        out.push(self.msg_type);
        out.extend_from_slice(&payload);
        out.extend_from_slice(&self.padding);
        Ok(())
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        Ssl2Record::read(data)
    }
}
