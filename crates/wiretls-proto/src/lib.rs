//! # wiretls-proto
//!
//! Wire grammars for the SSL/TLS and DTLS record and handshake layers:
//! record framing for all three header shapes (SSLv2, SSLv3/TLS, DTLS),
//! the handshake message schemas, and the handshake extension grammars.
//!
//! Decoding is two-phase the way a connection needs it: record `read`
//! splits off the framing and keeps the payload raw, `decode` or
//! `decode_payload` resolves the typed messages. Partial input always
//! fails with a retryable `NotEnoughData` that leaves the input untouched.

pub mod alert;
pub mod change_cipher_spec;
pub mod extensions;
pub mod handshake;
pub mod heartbeat;
pub mod record;
pub mod registry;

pub use alert::{Alert, AlertDescription, AlertLevel};
pub use change_cipher_spec::ChangeCipherSpec;
pub use extensions::{
    Extension, ExtensionBody, HeartbeatMode, ProtocolName, ServerName,
    SignatureAndHashAlgorithm,
};
pub use handshake::{
    Certificate, ClientHello, DtlsClientHello, DtlsHandshake, Handshake, HandshakeBody,
    HandshakeType, HelloVerifyRequest, ServerCertificate, ServerHello, Ssl2ClientHello,
    Ssl2ServerHello,
};
pub use heartbeat::{Heartbeat, HeartbeatMessageType};
pub use record::{
    ContentType, DtlsMessage, DtlsRecord, DtlsRecordPayload, Record, Ssl2Message, Ssl2Record,
    Ssl2RecordPayload, TlsMessage, TlsRecord, TlsRecordPayload,
};
pub use registry::{register_extension, register_payload, PayloadParent};
