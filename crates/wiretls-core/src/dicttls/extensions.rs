//! Handshake extension type constants.
//!
//! Source: https://www.iana.org/assignments/tls-extensiontype-values/tls-extensiontype-values.xhtml

pub const SERVER_NAME: u16 = 0x0000;
pub const MAX_FRAGMENT_LENGTH: u16 = 0x0001;
pub const STATUS_REQUEST: u16 = 0x0005;
pub const ELLIPTIC_CURVES: u16 = 0x000a;
pub const EC_POINT_FORMATS: u16 = 0x000b;
pub const SIGNATURE_ALGORITHMS: u16 = 0x000d;
pub const HEARTBEAT: u16 = 0x000f;
pub const APPLICATION_LAYER_PROTOCOL_NEGOTIATION: u16 = 0x0010;
pub const SIGNED_CERTIFICATE_TIMESTAMP: u16 = 0x0012;
pub const EXTENDED_MASTER_SECRET: u16 = 0x0017;
pub const SESSION_TICKET_TLS: u16 = 0x0023;
pub const NEXT_PROTOCOL_NEGOTIATION: u16 = 0x3374;
pub const RENEGOTIATION_INFO: u16 = 0xff01;

/// Name of an extension type identifier.
pub fn extension_name(id: u16) -> Option<&'static str> {
    match id {
        SERVER_NAME => Some("server_name"),
        MAX_FRAGMENT_LENGTH => Some("max_fragment_length"),
        STATUS_REQUEST => Some("status_request"),
        ELLIPTIC_CURVES => Some("elliptic_curves"),
        EC_POINT_FORMATS => Some("ec_point_formats"),
        SIGNATURE_ALGORITHMS => Some("signature_algorithms"),
        HEARTBEAT => Some("heartbeat"),
        APPLICATION_LAYER_PROTOCOL_NEGOTIATION => {
            Some("application_layer_protocol_negotiation")
        }
        SIGNED_CERTIFICATE_TIMESTAMP => Some("signed_certificate_timestamp"),
        EXTENDED_MASTER_SECRET => Some("extended_master_secret"),
        SESSION_TICKET_TLS => Some("session_ticket_tls"),
        NEXT_PROTOCOL_NEGOTIATION => Some("next_protocol_negotiation"),
        RENEGOTIATION_INFO => Some("renegotiation_info"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(extension_name(0x0000), Some("server_name"));
        assert_eq!(extension_name(0x3374), Some("next_protocol_negotiation"));
        assert_eq!(extension_name(0x2a2a), None);
    }
}
