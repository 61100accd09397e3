//! # wiretls
//!
//! An SSL/TLS and DTLS wire-format codec. Raw transport bytes go in,
//! structured records come out, and the reverse produces bit-exact wire
//! images. Five protocol profiles are covered: SSLv2, SSLv3, TLS 1.0 to
//! 1.2 and DTLS 1.0/1.2.
//!
//! The two connection facades own the stateful part of the job:
//!
//! * [`TlsConnection`] buffers a byte stream, parses records and coalesces
//!   record payloads so handshake messages split across records come out
//!   whole.
//! * [`DtlsConnection`] consumes datagrams and reassembles handshake
//!   fragments in `message_seq` order, however they arrive.
//!
//! Cryptography, certificate contents and socket I/O are out of scope;
//! certificates pass through as opaque blobs.
//!
//! ```
//! use wiretls::{ProtocolVersion, TlsConnection, TlsMessage};
//!
//! let mut connection = TlsConnection::new(ProtocolVersion::TLSv10);
//! connection.decode(&[0x15, 0x03, 0x01, 0x00, 0x02, 0x01, 0x00]).unwrap();
//!
//! match connection.pop_record() {
//!     Some(TlsMessage::Alert(alert)) => {
//!         assert_eq!(alert.description.name(), Some("close_notify"));
//!     }
//!     other => panic!("expected an alert, got {:?}", other),
//! }
//! ```

pub mod connection;
pub mod datagram;

pub use connection::{ConnectionError, TlsConnection};
pub use datagram::{DtlsConnection, ReplayWindow};

pub use wiretls_core::{
    dicttls, get_tls_version, get_version_by_version_id, get_version_name, Codec, CodecError,
    ProtocolVersion, Random, WireVersion,
};
pub use wiretls_proto::{
    register_extension, register_payload, Alert, AlertDescription, AlertLevel, Certificate,
    ChangeCipherSpec, ClientHello, ContentType, DtlsClientHello, DtlsHandshake, DtlsMessage,
    DtlsRecord, DtlsRecordPayload, Extension, ExtensionBody, Handshake, HandshakeBody,
    HandshakeType, Heartbeat, HeartbeatMessageType, HeartbeatMode, HelloVerifyRequest,
    PayloadParent, ProtocolName, Record, ServerCertificate, ServerHello, ServerName,
    SignatureAndHashAlgorithm, Ssl2ClientHello, Ssl2Message, Ssl2Record, Ssl2RecordPayload,
    Ssl2ServerHello, TlsMessage, TlsRecord, TlsRecordPayload,
};
