//! Error types shared by every codec in the workspace.

use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors produced while reading or writing wire data.
///
/// `NotEnoughData` is the only recoverable variant: the input was a valid
/// prefix of a larger unit and the caller may retry after feeding more
/// bytes. Every decoder that fails with it leaves the input untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The input ends before the named field or unit is complete.
    #[error("not enough data to decode {0}")]
    NotEnoughData(&'static str),

    /// A length-prefixed slab did not dissect into whole items, or an inner
    /// grammar left trailing bytes behind.
    #[error("malformed vector in {field}: {reason}")]
    MalformedVector {
        field: &'static str,
        reason: &'static str,
    },

    /// A symbolic name was used to set an enum field but no registered
    /// value carries that name.
    #[error("unknown name {name:?} for {field}")]
    InvalidEnumName { field: &'static str, name: String },

    /// Encoder-side check: a value or body length does not fit the wire
    /// width of its field.
    #[error("value {value} of {field} does not fit in {width} bits")]
    OverflowingLengthField {
        field: &'static str,
        value: u64,
        width: u8,
    },

    /// A complete outer container ended in the middle of an inner unit.
    /// Unlike `NotEnoughData`, more input cannot fix this.
    #[error("unexpected end of stream while decoding {0}")]
    UnexpectedEndOfStream(&'static str),
}

impl CodecError {
    /// True for the caller-recoverable "feed more bytes" case.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CodecError::NotEnoughData(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CodecError::NotEnoughData("record header");
        assert!(err.to_string().contains("record header"));

        let err = CodecError::OverflowingLengthField {
            field: "session_id",
            value: 300,
            width: 8,
        };
        assert!(err.to_string().contains("300"));
        assert!(err.to_string().contains("8"));
    }

    #[test]
    fn test_retryable() {
        assert!(CodecError::NotEnoughData("x").is_retryable());
        assert!(!CodecError::UnexpectedEndOfStream("x").is_retryable());
    }
}
