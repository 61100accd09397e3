//! Record layer framing for SSLv2, SSLv3/TLS and DTLS.
//!
//! The SSLv3/TLS and DTLS records share the content type discriminant;
//! SSLv2 has its own header with two shapes. `Record::read` sniffs the
//! framing of a raw stream the way a server facing unknown clients must:
//!
//! * bytes 3..5 equal `00 02` means an SSLv2 record carrying an SSLv2 hello
//! * byte 1 equal `0x03` means an SSLv3/TLS record
//!
//! Fewer than five buffered bytes cannot be classified yet.

mod dtls;
mod sslv2;
mod tls;

pub use dtls::{DtlsMessage, DtlsRecord, DtlsRecordPayload};
pub use sslv2::{Ssl2Message, Ssl2Record, Ssl2RecordPayload};
pub use tls::{TlsMessage, TlsRecord, TlsRecordPayload};

use wiretls_core::error::{CodecError, Result};

/// Record content type discriminant. Unknown values are preserved.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    ChangeCipherSpec,
    Alert,
    Handshake,
    ApplicationData,
    Heartbeat,
    Unknown(u8),
}

impl ContentType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            20 => ContentType::ChangeCipherSpec,
            21 => ContentType::Alert,
            22 => ContentType::Handshake,
            23 => ContentType::ApplicationData,
            24 => ContentType::Heartbeat,
            other => ContentType::Unknown(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            ContentType::ChangeCipherSpec => 20,
            ContentType::Alert => 21,
            ContentType::Handshake => 22,
            ContentType::ApplicationData => 23,
            ContentType::Heartbeat => 24,
            ContentType::Unknown(other) => other,
        }
    }

    pub fn name(self) -> Option<&'static str> {
        match self {
            ContentType::ChangeCipherSpec => Some("change_cipher_spec"),
            ContentType::Alert => Some("alert"),
            ContentType::Handshake => Some("handshake"),
            ContentType::ApplicationData => Some("application_data"),
            ContentType::Heartbeat => Some("heartbeat"),
            ContentType::Unknown(_) => None,
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        let value = match name {
            "change_cipher_spec" => ContentType::ChangeCipherSpec,
            "alert" => ContentType::Alert,
            "handshake" => ContentType::Handshake,
            "application_data" => ContentType::ApplicationData,
            "heartbeat" => ContentType::Heartbeat,
            _ => {
                return Err(CodecError::InvalidEnumName {
                    field: "content type",
                    name: name.to_string(),
                })
            }
        };
        Ok(value)
    }
}

/// Any outermost framing unit.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Ssl2(Ssl2Record),
    Tls(TlsRecord),
    Dtls(DtlsRecord),
}

impl Record {
    /// Sniff and parse one record from a raw stream, decoding its payload.
    /// DTLS records are never sniffed; datagram callers know their framing.
    pub fn decode(data: &[u8]) -> Result<(Record, &[u8])> {
        if data.len() < 5 {
            return Err(CodecError::NotEnoughData("record header"));
        }
        if data[3] == 0x00 && data[4] == 0x02 {
            let (record, rest) = Ssl2Record::decode(data)?;
            Ok((Record::Ssl2(record), rest))
        } else if data[1] == 0x03 {
            let (record, rest) = TlsRecord::decode(data)?;
            Ok((Record::Tls(record), rest))
        } else {
            Err(CodecError::MalformedVector {
                field: "record",
                reason: "unrecognized record header",
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_round_trip() {
        for value in [20u8, 21, 22, 23, 24, 99] {
            assert_eq!(ContentType::from_u8(value).as_u8(), value);
        }
        assert_eq!(ContentType::from_u8(99), ContentType::Unknown(99));
    }

    #[test]
    fn test_content_type_names() {
        assert_eq!(ContentType::Handshake.name(), Some("handshake"));
        assert_eq!(
            ContentType::from_name("alert").unwrap(),
            ContentType::Alert
        );
        assert!(ContentType::from_name("telnet").is_err());
    }

    #[test]
    fn test_sniff_needs_five_bytes() {
        let err = Record::decode(&[0x16, 0x03, 0x00, 0x00]).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_sniff_sslv2_vs_tls() {
        // SSLv2 ClientHello header: length 9, type 1, version (0, 2)
        let data = hex::decode("8009010002000000000000").unwrap();
        let (record, _) = Record::decode(&data).unwrap();
        assert!(matches!(record, Record::Ssl2(_)));

        // SSLv3 alert
        let data = hex::decode("15030000020102").unwrap();
        let (record, _) = Record::decode(&data).unwrap();
        assert!(matches!(record, Record::Tls(_)));
    }

    #[test]
    fn test_sniff_rejects_garbage() {
        let err = Record::decode(&[0x00, 0x99, 0x00, 0x99, 0x00]).unwrap_err();
        assert!(matches!(err, CodecError::MalformedVector { .. }));
    }
}
