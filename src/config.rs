//! JSON configuration for a [`PinningConnector`].
//!
//! ```json
//! {
//!   "pins": ["sha256/s+xUlcaUY3JfY6ABjSAQDdUXlkUUtgDghW6SdU7Gwgs="],
//!   "verification": "chain_and_pin",
//!   "connect_timeout_ms": 10000,
//!   "alpn": ["http/1.1"]
//! }
//! ```

use crate::base::neterror::NetError;
use crate::socket::connectjob::PinningConnector;
use crate::socket::tls::{CertVerification, TlsConfig};
use crate::tls::pinning::{Fingerprint, FingerprintSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PinningConfig {
    pub pins: Vec<Fingerprint>,
    #[serde(default)]
    pub verification: CertVerification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpn: Option<Vec<String>>,
}

impl PinningConfig {
    pub fn from_json(json: &str) -> Result<Self, NetError> {
        serde_json::from_str(json).map_err(|e| NetError::InvalidConfig {
            reason: e.to_string(),
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, NetError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| NetError::InvalidConfig {
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::from_json(&raw)
    }

    pub fn tls_config(&self) -> TlsConfig {
        let mut tls = TlsConfig::new();
        tls.set_verification(self.verification);
        if let Some(ms) = self.connect_timeout_ms {
            tls = tls.with_connect_timeout(Duration::from_millis(ms));
        }
        if let Some(alpn) = &self.alpn {
            tls = tls.with_alpn(alpn.iter().cloned());
        }
        tls
    }

    pub fn fingerprint_set(&self) -> FingerprintSet {
        FingerprintSet::new(self.pins.iter().copied())
    }

    pub fn into_connector(self) -> Result<PinningConnector, NetError> {
        PinningConnector::new(self.fingerprint_set(), self.tls_config())
    }
}
