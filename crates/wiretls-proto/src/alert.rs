//! Alert protocol messages.
//!
//! ```text
//! struct {
//!     AlertLevel level;              // 1 byte
//!     AlertDescription description;  // 1 byte
//! } Alert;
//! ```

use wiretls_core::codec::{self, Codec};
use wiretls_core::error::{CodecError, Result};

/// Alert severity. Unknown values are preserved verbatim.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlertLevel(pub u8);

impl AlertLevel {
    pub const WARNING: AlertLevel = AlertLevel(1);
    pub const FATAL: AlertLevel = AlertLevel(2);

    pub fn name(self) -> Option<&'static str> {
        match self.0 {
            1 => Some("warning"),
            2 => Some("fatal"),
            _ => None,
        }
    }

    /// Look up a level by its registered name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "warning" => Ok(AlertLevel::WARNING),
            "fatal" => Ok(AlertLevel::FATAL),
            _ => Err(CodecError::InvalidEnumName {
                field: "alert level",
                name: name.to_string(),
            }),
        }
    }
}

/// Alert description (RFC 5246 section 7.2).
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlertDescription(pub u8);

impl AlertDescription {
    pub const CLOSE_NOTIFY: AlertDescription = AlertDescription(0);
    pub const UNEXPECTED_MESSAGE: AlertDescription = AlertDescription(10);
    pub const BAD_RECORD_MAC: AlertDescription = AlertDescription(20);
    pub const RECORD_OVERFLOW: AlertDescription = AlertDescription(22);
    pub const HANDSHAKE_FAILURE: AlertDescription = AlertDescription(40);
    pub const ILLEGAL_PARAMETER: AlertDescription = AlertDescription(47);
    pub const DECODE_ERROR: AlertDescription = AlertDescription(50);
    pub const PROTOCOL_VERSION: AlertDescription = AlertDescription(70);
    pub const NO_RENEGOTIATION: AlertDescription = AlertDescription(100);
    pub const UNSUPPORTED_EXTENSION: AlertDescription = AlertDescription(110);

    pub fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("close_notify"),
            10 => Some("unexpected_message"),
            20 => Some("bad_record_mac"),
            21 => Some("decryption_failed_RESERVED"),
            22 => Some("record_overflow"),
            30 => Some("decompression_failure"),
            40 => Some("handshake_failure"),
            41 => Some("no_certificate_RESERVED"),
            42 => Some("bad_certificate"),
            43 => Some("unsupported_certificate"),
            44 => Some("certificate_revoked"),
            45 => Some("certificate_expired"),
            46 => Some("certificate_unknown"),
            47 => Some("illegal_parameter"),
            48 => Some("unknown_ca"),
            49 => Some("access_denied"),
            50 => Some("decode_error"),
            51 => Some("decrypt_error"),
            60 => Some("export_restriction_RESERVED"),
            70 => Some("protocol_version"),
            71 => Some("insufficient_security"),
            80 => Some("internal_error"),
            90 => Some("user_canceled"),
            100 => Some("no_renegotiation"),
            110 => Some("unsupported_extension"),
            _ => None,
        }
    }
}

/// A single alert message.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub description: AlertDescription,
}

impl Alert {
    pub fn new(level: AlertLevel, description: AlertDescription) -> Self {
        Alert { level, description }
    }

    pub fn is_fatal(&self) -> bool {
        self.level == AlertLevel::FATAL
    }
}

impl Codec for Alert {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        out.push(self.level.0);
        out.push(self.description.0);
        Ok(())
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (level, rest) = codec::read_u8(data, "alert level")?;
        let (description, rest) = codec::read_u8(rest, "alert description")?;
        Ok((
            Alert {
                level: AlertLevel(level),
                description: AlertDescription(description),
            },
            rest,
        ))
    }
}
