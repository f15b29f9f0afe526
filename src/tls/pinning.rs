//! Public key pinning.
//!
//! Validates server certificate chains against expected SPKI (Subject Public
//! Key Info) SHA-256 hashes. A chain is accepted when any certificate in it
//! carries a pinned key, independent of certificate authority trust.

use crate::base::neterror::NetError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use boring::x509::X509Ref;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const PIN_PREFIX: &str = "sha256/";

/// SHA-256 hash of a DER-encoded SubjectPublicKeyInfo.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a base64 pin, with or without the `sha256/` prefix.
    pub fn from_base64(pin: &str) -> Result<Self, NetError> {
        let encoded = pin.trim();
        let encoded = encoded.strip_prefix(PIN_PREFIX).unwrap_or(encoded);

        let decoded = STANDARD
            .decode(encoded)
            .map_err(|e| NetError::InvalidPin {
                reason: format!("{pin:?} is not valid base64: {e}"),
            })?;

        let bytes: [u8; 32] = decoded.try_into().map_err(|v: Vec<u8>| NetError::InvalidPin {
            reason: format!("{pin:?} decodes to {} bytes, expected 32", v.len()),
        })?;
        Ok(Self(bytes))
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Fingerprint {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PIN_PREFIX}{}", self.to_base64())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pin = String::deserialize(deserializer)?;
        Fingerprint::from_base64(&pin).map_err(serde::de::Error::custom)
    }
}

/// The certificate that satisfied the pin check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMatch {
    /// Position in the chain as presented by the peer (leaf is 0).
    pub index: usize,
    pub fingerprint: Fingerprint,
}

/// Immutable allow-list of SPKI fingerprints.
///
/// Built once before any connection attempt and shared read-only afterwards.
/// Order carries no meaning; any member matching is enough. An empty set is
/// valid and rejects every chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerprintSet {
    pins: Vec<Fingerprint>,
}

impl FingerprintSet {
    pub fn new<I, F>(pins: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Fingerprint>,
    {
        Self {
            pins: pins.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a set from base64 pins (`sha256/` prefix optional).
    pub fn from_base64<'a, I>(pins: I) -> Result<Self, NetError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let pins = pins
            .into_iter()
            .map(Fingerprint::from_base64)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { pins })
    }

    /// Exact byte comparison against every member.
    pub fn contains(&self, candidate: &Fingerprint) -> bool {
        self.pins.iter().any(|pin| pin == candidate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fingerprint> {
        self.pins.iter()
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Scan a certificate chain in presentation order and stop at the first
    /// certificate whose public key is pinned.
    ///
    /// A key that cannot be encoded aborts the scan with
    /// [`NetError::SslServerCertBadFormat`]; certificates after a match are
    /// never examined.
    pub fn check_chain<'a, I>(&self, chain: I) -> Result<PinMatch, NetError>
    where
        I: IntoIterator<Item = &'a X509Ref>,
    {
        let mut examined = 0usize;
        for (index, cert) in chain.into_iter().enumerate() {
            examined += 1;
            let fingerprint = spki_hash(cert)?;
            if self.contains(&fingerprint) {
                tracing::debug!(index, pin = %fingerprint, "pinned key found in chain");
                return Ok(PinMatch { index, fingerprint });
            }
        }

        tracing::debug!(examined, pins = self.pins.len(), "no pinned key in chain");
        Err(NetError::SslPinnedKeyNotInCertChain)
    }
}

impl FromIterator<Fingerprint> for FingerprintSet {
    fn from_iter<T: IntoIterator<Item = Fingerprint>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Compute the SPKI hash of a parsed certificate.
pub fn spki_hash(cert: &X509Ref) -> Result<Fingerprint, NetError> {
    use boring::hash::{hash, MessageDigest};

    let pubkey = cert
        .public_key()
        .map_err(|e| NetError::SslServerCertBadFormat {
            reason: format!("public key decode failed: {e}"),
        })?;
    let spki_der = pubkey
        .public_key_to_der()
        .map_err(|e| NetError::SslServerCertBadFormat {
            reason: format!("public key encode failed: {e}"),
        })?;

    let digest =
        hash(MessageDigest::sha256(), &spki_der).map_err(|e| NetError::SslServerCertBadFormat {
            reason: format!("sha256 failed: {e}"),
        })?;

    let mut result = [0u8; 32];
    result.copy_from_slice(&digest);
    Ok(Fingerprint(result))
}

/// Compute the SPKI hash from a DER-encoded certificate.
pub fn spki_hash_der(cert_der: &[u8]) -> Result<Fingerprint, NetError> {
    let cert = boring::x509::X509::from_der(cert_der).map_err(|e| {
        NetError::SslServerCertBadFormat {
            reason: format!("certificate parse failed: {e}"),
        }
    })?;
    spki_hash(&cert)
}
