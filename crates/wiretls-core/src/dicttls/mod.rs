//! TLS wire constant tables.
//!
//! Static identifier-to-name dictionaries from the IANA TLS parameter
//! registries. The codec never consults these to decide how to parse;
//! they exist so callers can label decoded values.

pub mod cipher_suites;
pub mod compression_methods;
pub mod extensions;
pub mod signature_schemes;
pub mod supported_groups;

pub use cipher_suites::{cipher_suite_name, ssl2_cipher_kind_name};
pub use compression_methods::compression_method_name;
pub use extensions::extension_name;
pub use signature_schemes::{hash_algorithm_name, signature_algorithm_name};
pub use supported_groups::named_group_name;
