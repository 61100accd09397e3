//! Server certificate message.
//!
//! ```text
//! opaque ASN.1Cert<1..2^24-1>;
//!
//! struct {
//!     ASN.1Cert certificate_list<0..2^24-1>;
//! } Certificate;
//! ```
//!
//! Certificates are opaque DER blobs; nothing here looks inside them.

use wiretls_core::codec::{self, Codec};
use wiretls_core::error::Result;

/// One DER-encoded certificate with its 24-bit length prefix.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate(pub Vec<u8>);

impl Certificate {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Codec for Certificate {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        codec::put_opaque24(out, &self.0, "certificate")
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (body, rest) = codec::read_opaque24(data, "certificate")?;
        Ok((Certificate(body), rest))
    }
}

/// Certificate chain sent by the server, leaf first.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerCertificate {
    pub certificate_list: Vec<Certificate>,
}

impl ServerCertificate {
    pub fn new(certificate_list: Vec<Certificate>) -> Self {
        ServerCertificate { certificate_list }
    }
}

impl Codec for ServerCertificate {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        codec::put_list24(out, &self.certificate_list, "certificate_list")
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (certificate_list, rest) = codec::read_list24::<Certificate>(data, "certificate_list")?;
        Ok((ServerCertificate { certificate_list }, rest))
    }
}
