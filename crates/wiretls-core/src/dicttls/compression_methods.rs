//! Compression method constants.
//!
//! Source: https://www.iana.org/assignments/comp-meth-ids/comp-meth-ids.xhtml

pub const COMPRESSION_NULL: u8 = 0;
pub const COMPRESSION_DEFLATE: u8 = 1;
pub const COMPRESSION_LZS: u8 = 64;

/// Name of a compression method identifier.
pub fn compression_method_name(id: u8) -> Option<&'static str> {
    match id {
        COMPRESSION_NULL => Some("null"),
        COMPRESSION_DEFLATE => Some("deflate"),
        COMPRESSION_LZS => Some("lzs"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(compression_method_name(0), Some("null"));
        assert_eq!(compression_method_name(1), Some("deflate"));
        assert_eq!(compression_method_name(2), None);
    }
}
