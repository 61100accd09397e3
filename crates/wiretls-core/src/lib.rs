//! # wiretls-core
//!
//! Shared building blocks for the wiretls workspace: primitive field and
//! vector codecs, the protocol version registry, error types and the static
//! wire constant tables.
//!
//! Everything here is transport and grammar agnostic. The record and
//! handshake grammars live in `wiretls-proto`; the stream and datagram
//! connection state machines live in `wiretls`.

pub mod codec;
pub mod dicttls;
pub mod error;
pub mod version;

pub use codec::{Codec, Random};
pub use error::{CodecError, Result};
pub use version::{
    get_tls_version, get_version_by_version_id, get_version_name, ProtocolVersion, WireVersion,
};
