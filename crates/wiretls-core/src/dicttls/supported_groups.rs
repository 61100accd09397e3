//! Named group (elliptic curve) constants.
//!
//! Source: https://www.iana.org/assignments/tls-parameters/tls-parameters.xhtml#tls-parameters-8

pub const SECT163K1: u16 = 0x0001;
pub const SECT163R1: u16 = 0x0002;
pub const SECT163R2: u16 = 0x0003;
pub const SECT193R1: u16 = 0x0004;
pub const SECT193R2: u16 = 0x0005;
pub const SECT233K1: u16 = 0x0006;
pub const SECT233R1: u16 = 0x0007;
pub const SECT239K1: u16 = 0x0008;
pub const SECT283K1: u16 = 0x0009;
pub const SECT283R1: u16 = 0x000a;
pub const SECT409K1: u16 = 0x000b;
pub const SECT409R1: u16 = 0x000c;
pub const SECT571K1: u16 = 0x000d;
pub const SECT571R1: u16 = 0x000e;
pub const SECP160K1: u16 = 0x000f;
pub const SECP160R1: u16 = 0x0010;
pub const SECP160R2: u16 = 0x0011;
pub const SECP192K1: u16 = 0x0012;
pub const SECP192R1: u16 = 0x0013;
pub const SECP224K1: u16 = 0x0014;
pub const SECP224R1: u16 = 0x0015;
pub const SECP256K1: u16 = 0x0016;
pub const SECP256R1: u16 = 0x0017;
pub const SECP384R1: u16 = 0x0018;
pub const SECP521R1: u16 = 0x0019;
pub const X25519: u16 = 0x001d;
pub const X448: u16 = 0x001e;

/// IANA name of a named group identifier.
pub fn named_group_name(id: u16) -> Option<&'static str> {
    match id {
        SECT163K1 => Some("sect163k1"),
        SECT163R1 => Some("sect163r1"),
        SECT163R2 => Some("sect163r2"),
        SECT193R1 => Some("sect193r1"),
        SECT193R2 => Some("sect193r2"),
        SECT233K1 => Some("sect233k1"),
        SECT233R1 => Some("sect233r1"),
        SECT239K1 => Some("sect239k1"),
        SECT283K1 => Some("sect283k1"),
        SECT283R1 => Some("sect283r1"),
        SECT409K1 => Some("sect409k1"),
        SECT409R1 => Some("sect409r1"),
        SECT571K1 => Some("sect571k1"),
        SECT571R1 => Some("sect571r1"),
        SECP160K1 => Some("secp160k1"),
        SECP160R1 => Some("secp160r1"),
        SECP160R2 => Some("secp160r2"),
        SECP192K1 => Some("secp192k1"),
        SECP192R1 => Some("secp192r1"),
        SECP224K1 => Some("secp224k1"),
        SECP224R1 => Some("secp224r1"),
        SECP256K1 => Some("secp256k1"),
        SECP256R1 => Some("secp256r1"),
        SECP384R1 => Some("secp384r1"),
        SECP521R1 => Some("secp521r1"),
        X25519 => Some("x25519"),
        X448 => Some("x448"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(named_group_name(SECP256R1), Some("secp256r1"));
        assert_eq!(named_group_name(0x6399), None);
    }
}
