//! Hello messages for the stream and datagram handshakes.
//!
//! ```text
//! struct {
//!     ProtocolVersion client_version;
//!     Random random;
//!     SessionID session_id<0..32>;
//!     CipherSuite cipher_suites<2..2^16-2>;
//!     CompressionMethod compression_methods<1..2^8-1>;
//!     Extension extensions<0..2^16-1>;    // may be absent entirely
//! } ClientHello;
//! ```
//!
//! The DTLS ClientHello inserts a cookie vector after the session id. The
//! HelloVerifyRequest that transports that cookie exists only on the
//! datagram side.

use wiretls_core::codec::{self, Codec, Random};
use wiretls_core::error::Result;
use wiretls_core::version::WireVersion;

use crate::extensions::{read_extensions, write_extensions, Extension};

/// Stream profile ClientHello.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientHello {
    pub version: WireVersion,
    pub random: Random,
    pub session_id: Vec<u8>,
    pub cipher_suites: Vec<u16>,
    pub compression_methods: Vec<u8>,
    pub extensions: Vec<Extension>,
}

impl ClientHello {
    pub fn new(version: WireVersion) -> Self {
        ClientHello {
            version,
            random: Random::generate(),
            compression_methods: vec![0],
            ..ClientHello::default()
        }
    }
}

impl Codec for ClientHello {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        self.version.write(out)?;
        self.random.write(out)?;
        codec::put_opaque8(out, &self.session_id, "session_id")?;
        codec::put_list16(out, &self.cipher_suites, "cipher_suites")?;
        codec::put_list8(out, &self.compression_methods, "compression_methods")?;
        write_extensions(out, &self.extensions)
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (version, rest) = WireVersion::read(data)?;
        let (random, rest) = Random::read(rest)?;
        let (session_id, rest) = codec::read_opaque8(rest, "session_id")?;
        let (cipher_suites, rest) = codec::read_list16::<u16>(rest, "cipher_suites")?;
        let (compression_methods, rest) = codec::read_list8::<u8>(rest, "compression_methods")?;
        let (extensions, rest) = read_extensions(rest)?;
        Ok((
            ClientHello {
                version,
                random,
                session_id,
                cipher_suites,
                compression_methods,
                extensions,
            },
            rest,
        ))
    }
}

/// Datagram profile ClientHello; carries the HelloVerifyRequest cookie.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DtlsClientHello {
    pub version: WireVersion,
    pub random: Random,
    pub session_id: Vec<u8>,
    pub cookie: Vec<u8>,
    pub cipher_suites: Vec<u16>,
    pub compression_methods: Vec<u8>,
    pub extensions: Vec<Extension>,
}

impl DtlsClientHello {
    pub fn new(version: WireVersion) -> Self {
        DtlsClientHello {
            version,
            random: Random::generate(),
            compression_methods: vec![0],
            ..DtlsClientHello::default()
        }
    }
}

impl Codec for DtlsClientHello {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        self.version.write(out)?;
        self.random.write(out)?;
        codec::put_opaque8(out, &self.session_id, "session_id")?;
        codec::put_opaque8(out, &self.cookie, "cookie")?;
        codec::put_list16(out, &self.cipher_suites, "cipher_suites")?;
        codec::put_list8(out, &self.compression_methods, "compression_methods")?;
        write_extensions(out, &self.extensions)
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (version, rest) = WireVersion::read(data)?;
        let (random, rest) = Random::read(rest)?;
        let (session_id, rest) = codec::read_opaque8(rest, "session_id")?;
        let (cookie, rest) = codec::read_opaque8(rest, "cookie")?;
        let (cipher_suites, rest) = codec::read_list16::<u16>(rest, "cipher_suites")?;
        let (compression_methods, rest) = codec::read_list8::<u8>(rest, "compression_methods")?;
        let (extensions, rest) = read_extensions(rest)?;
        Ok((
            DtlsClientHello {
                version,
                random,
                session_id,
                cookie,
                cipher_suites,
                compression_methods,
                extensions,
            },
            rest,
        ))
    }
}

/// ServerHello, shared by both profiles.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerHello {
    pub version: WireVersion,
    pub random: Random,
    pub session_id: Vec<u8>,
    pub cipher_suite: u16,
    pub compression_method: u8,
    pub extensions: Vec<Extension>,
}

impl Codec for ServerHello {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        self.version.write(out)?;
        self.random.write(out)?;
        codec::put_opaque8(out, &self.session_id, "session_id")?;
        codec::put_u16(out, self.cipher_suite);
        out.push(self.compression_method);
        write_extensions(out, &self.extensions)
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (version, rest) = WireVersion::read(data)?;
        let (random, rest) = Random::read(rest)?;
        let (session_id, rest) = codec::read_opaque8(rest, "session_id")?;
        let (cipher_suite, rest) = codec::read_u16(rest, "cipher_suite")?;
        let (compression_method, rest) = codec::read_u8(rest, "compression_method")?;
        let (extensions, rest) = read_extensions(rest)?;
        Ok((
            ServerHello {
                version,
                random,
                session_id,
                cipher_suite,
                compression_method,
                extensions,
            },
            rest,
        ))
    }
}

/// DTLS cookie challenge sent in response to a cookie-less ClientHello.
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HelloVerifyRequest {
    pub version: WireVersion,
    pub cookie: Vec<u8>,
}

impl Codec for HelloVerifyRequest {
    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        self.version.write(out)?;
        codec::put_opaque8(out, &self.cookie, "cookie")
    }

    fn read(data: &[u8]) -> Result<(Self, &[u8])> {
        let (version, rest) = WireVersion::read(data)?;
        let (cookie, rest) = codec::read_opaque8(rest, "cookie")?;
        Ok((HelloVerifyRequest { version, cookie }, rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_hello_round_trip() {
        let hello = ClientHello {
            version: WireVersion::new(3, 3),
            random: Random([7u8; 32]),
            session_id: vec![1, 2, 3],
            cipher_suites: vec![0xc02f, 0xc030],
            compression_methods: vec![0],
            extensions: vec![Extension::session_ticket(Vec::new())],
        };
        let bytes = hello.to_bytes().unwrap();
        let (decoded, rest) = ClientHello::read(&bytes).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, hello);
    }

    #[test]
    fn test_client_hello_without_extensions_block() {
        let hello = ClientHello {
            version: WireVersion::new(3, 0),
            cipher_suites: vec![0x0039],
            compression_methods: vec![0],
            ..ClientHello::default()
        };
        let bytes = hello.to_bytes().unwrap();
        // version + random + empty session id + suites + compression, no
        // extensions header at all
        assert_eq!(bytes.len(), 2 + 32 + 1 + 2 + 2 + 1 + 1);

        let (decoded, rest) = ClientHello::read(&bytes).unwrap();
        assert!(rest.is_empty());
        assert!(decoded.extensions.is_empty());
        assert_eq!(decoded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_dtls_client_hello_cookie() {
        let hello = DtlsClientHello {
            version: WireVersion::new(254, 255),
            cookie: vec![0xaa; 20],
            cipher_suites: vec![0xc014],
            compression_methods: vec![0],
            ..DtlsClientHello::default()
        };
        let bytes = hello.to_bytes().unwrap();
        let (decoded, rest) = DtlsClientHello::read(&bytes).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded.cookie.len(), 20);
        assert_eq!(decoded, hello);
    }

    #[test]
    fn test_hello_verify_request_round_trip() {
        let verify = HelloVerifyRequest {
            version: WireVersion::new(254, 255),
            cookie: vec![1, 2, 3, 4],
        };
        let bytes = verify.to_bytes().unwrap();
        assert_eq!(bytes, vec![254, 255, 4, 1, 2, 3, 4]);
        let (decoded, _) = HelloVerifyRequest::read(&bytes).unwrap();
        assert_eq!(decoded, verify);
    }

    #[test]
    fn test_truncated_random_is_retryable() {
        let mut bytes = vec![3, 3];
        bytes.extend_from_slice(&[0u8; 16]);
        let err = ClientHello::read(&bytes).unwrap_err();
        assert!(err.is_retryable());
    }
}
