//! Change cipher spec protocol message.
//!
//! A single byte, always 1 on the wire.

use wiretls_core::codec::{self, Codec};
use wiretls_core::error::Result;

#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeCipherSpec {
    pub value: u8,
}

impl Default for ChangeCipherSpec {
    fn default() -> Self {
        ChangeCipherSpec { value: 1 }
    }
}

impl Codec for ChangeCipherSpec {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        out.push(self.value);
        Ok(())
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (value, rest) = codec::read_u8(data, "change_cipher_spec")?;
        Ok((ChangeCipherSpec { value }, rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let ccs = ChangeCipherSpec::default();
        let bytes = ccs.to_bytes().unwrap();
        assert_eq!(bytes, vec![1]);

        let (decoded, rest) = ChangeCipherSpec::read(&bytes).unwrap();
        assert_eq!(decoded, ccs);
        assert!(rest.is_empty());
    }
}
