//! Process-wide payload grammar registries.
//!
//! Extensions and handshake payloads are both dispatched through a static
//! map keyed on the wire identifier. The maps are populated with the
//! built-in grammars the first time they are touched and are read-mostly
//! afterwards; `register_extension` and `register_payload` let callers add
//! grammars for types the library does not know about.
//!
//! Keeping dispatch here, away from the grammar modules themselves, is what
//! lets records depend on handshakes and handshakes depend on extensions
//! without a cycle.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use wiretls_core::error::Result;

use crate::extensions::{self, ExtensionBody};
use crate::handshake::{self, HandshakeBody};

/// Decodes one extension body slab into a typed body.
pub type ExtensionDecoder = fn(&[u8]) -> Result<ExtensionBody>;

/// Decodes one handshake body slab into a typed body.
pub type HandshakeBodyDecoder = fn(&[u8]) -> Result<HandshakeBody>;

/// Parent grammar a handshake payload is registered under. The stream and
/// datagram handshake headers dispatch to different payload tables because
/// a few message types differ between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadParent {
    Handshake,
    DtlsHandshake,
}

static EXTENSIONS: Lazy<RwLock<HashMap<u16, ExtensionDecoder>>> =
    Lazy::new(|| RwLock::new(extensions::builtin_decoders()));

static HANDSHAKES: Lazy<RwLock<HashMap<(PayloadParent, u8), HandshakeBodyDecoder>>> =
    Lazy::new(|| RwLock::new(handshake::builtin_decoders()));

/// Register a body grammar for an extension type, replacing any previous
/// registration.
pub fn register_extension(ext_type: u16, decoder: ExtensionDecoder) {
    let mut map = EXTENSIONS.write().unwrap_or_else(|e| e.into_inner());
    map.insert(ext_type, decoder);
}

/// Register a body grammar for a handshake message type under the given
/// parent, replacing any previous registration.
pub fn register_payload(parent: PayloadParent, msg_type: u8, decoder: HandshakeBodyDecoder) {
    let mut map = HANDSHAKES.write().unwrap_or_else(|e| e.into_inner());
    map.insert((parent, msg_type), decoder);
}

pub(crate) fn extension_decoder(ext_type: u16) -> Option<ExtensionDecoder> {
    let map = EXTENSIONS.read().unwrap_or_else(|e| e.into_inner());
    map.get(&ext_type).copied()
}

pub(crate) fn handshake_decoder(
    parent: PayloadParent,
    msg_type: u8,
) -> Option<HandshakeBodyDecoder> {
    let map = HANDSHAKES.read().unwrap_or_else(|e| e.into_inner());
    map.get(&(parent, msg_type)).copied()
}
