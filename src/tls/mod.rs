//! Public key pinning primitives.

pub mod pinning;

pub use pinning::{spki_hash, spki_hash_der, Fingerprint, FingerprintSet, PinMatch};
