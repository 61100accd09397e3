//! Heartbeat protocol messages (RFC 6520).
//!
//! ```text
//! struct {
//!     HeartbeatMessageType type;    // 1 byte
//!     uint16 payload_length;        // 2 bytes
//!     opaque payload[payload_length];
//!     opaque padding[padding_length];   // rest of the record body
//! } HeartbeatMessage;
//! ```
//!
//! The padding has no length field of its own; a heartbeat message always
//! spans the whole record body.

use wiretls_core::codec::{self, Codec};
use wiretls_core::error::{CodecError, Result};

/// Request or response discriminator.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeartbeatMessageType(pub u8);

impl HeartbeatMessageType {
    pub const REQUEST: HeartbeatMessageType = HeartbeatMessageType(1);
    pub const RESPONSE: HeartbeatMessageType = HeartbeatMessageType(2);

    pub fn name(self) -> Option<&'static str> {
        match self.0 {
            1 => Some("request"),
            2 => Some("response"),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "request" => Ok(HeartbeatMessageType::REQUEST),
            "response" => Ok(HeartbeatMessageType::RESPONSE),
            _ => Err(CodecError::InvalidEnumName {
                field: "heartbeat type",
                name: name.to_string(),
            }),
        }
    }
}

#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heartbeat {
    pub msg_type: HeartbeatMessageType,
    pub payload: Vec<u8>,
    pub padding: Vec<u8>,
}

impl Heartbeat {
    pub fn request(payload: Vec<u8>) -> Self {
        Heartbeat {
            msg_type: HeartbeatMessageType::REQUEST,
            payload,
            padding: Vec::new(),
        }
    }

    pub fn response(payload: Vec<u8>) -> Self {
        Heartbeat {
            msg_type: HeartbeatMessageType::RESPONSE,
            payload,
            padding: Vec::new(),
        }
    }
}

impl Codec for Heartbeat {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        out.push(self.msg_type.0);
        codec::put_opaque16(out, &self.payload, "heartbeat payload")?;
        out.extend_from_slice(&self.padding);
        Ok(())
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (msg_type, rest) = codec::read_u8(data, "heartbeat type")?;
        let (payload, rest) = codec::read_opaque16(rest, "heartbeat payload")?;
        // Everything after the payload is padding.
        Ok((
            Heartbeat {
                msg_type: HeartbeatMessageType(msg_type),
                payload,
                padding: rest.to_vec(),
            },
            &rest[rest.len()..],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_with_padding() {
        let heartbeat = Heartbeat {
            msg_type: HeartbeatMessageType::REQUEST,
            payload: vec![0xde, 0xad],
            padding: vec![0u8; 16],
        };
        let bytes = heartbeat.to_bytes().unwrap();
        assert_eq!(&bytes[..5], &[1, 0, 2, 0xde, 0xad]);
        assert_eq!(bytes.len(), 5 + 16);

        let (decoded, rest) = Heartbeat::read(&bytes).unwrap();
        assert_eq!(decoded, heartbeat);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_truncated_payload() {
        // Declares 4 payload bytes but carries only 2.
        let err = Heartbeat::read(&[1, 0, 4, 0xaa, 0xbb]).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(HeartbeatMessageType::RESPONSE.name(), Some("response"));
        assert!(HeartbeatMessageType::from_name("request").is_ok());
        assert!(HeartbeatMessageType::from_name("ping").is_err());
    }
}
