use crate::base::neterror::NetError;
use boring::ssl::{SslConnectorBuilder, SslVerifyMode, SslVersion};
use boring::x509::X509;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How much of standard certificate verification runs before the pin check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertVerification {
    /// Chain validation and hostname verification, then the pin check.
    #[default]
    ChainAndPin,
    /// Pin check only. A self-signed or mis-issued certificate is accepted as
    /// long as some key in the chain is pinned.
    PinOnlyInsecure,
}

impl CertVerification {
    pub fn verifies_chain(&self) -> bool {
        matches!(self, CertVerification::ChainAndPin)
    }
}

/// TLS settings for pinned connections.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub min_version: Option<SslVersion>,
    pub max_version: Option<SslVersion>,
    pub alpn_protos: Vec<String>,
    /// Extra trust anchors added to the default verify store.
    pub root_certificates: Vec<X509>,
    /// Bounds dial, handshake and pin check together.
    pub connect_timeout: Option<Duration>,
    verification: CertVerification,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            min_version: Some(SslVersion::TLS1_2),
            max_version: Some(SslVersion::TLS1_3),
            alpn_protos: vec!["http/1.1".to_string()],
            root_certificates: Vec::new(),
            connect_timeout: None,
            verification: CertVerification::ChainAndPin,
        }
    }
}

impl TlsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip chain and hostname validation and rely on the pin check alone.
    ///
    /// This removes protection against any peer that happens to hold a pinned
    /// key under a forged or self-signed certificate. Use only when the pinned
    /// keys are the sole trust root.
    pub fn dangerous_pin_only(mut self) -> Self {
        self.verification = CertVerification::PinOnlyInsecure;
        self
    }

    pub fn verification(&self) -> CertVerification {
        self.verification
    }

    pub(crate) fn set_verification(&mut self, verification: CertVerification) {
        self.verification = verification;
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_alpn<I, P>(mut self, protos: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.alpn_protos = protos.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_root_certificate(mut self, cert: X509) -> Self {
        self.root_certificates.push(cert);
        self
    }

    /// Apply this configuration to an SSL connector builder.
    pub fn apply_to_builder(&self, builder: &mut SslConnectorBuilder) -> Result<(), NetError> {
        if let Some(min) = self.min_version {
            builder
                .set_min_proto_version(Some(min))
                .map_err(protocol_error)?;
        }
        if let Some(max) = self.max_version {
            builder
                .set_max_proto_version(Some(max))
                .map_err(protocol_error)?;
        }

        if !self.alpn_protos.is_empty() {
            let mut alpn_wire = Vec::new();
            for proto in &self.alpn_protos {
                if proto.is_empty() || proto.len() > 255 {
                    return Err(NetError::InvalidArgument {
                        reason: format!("ALPN protocol {proto:?} must be 1..=255 bytes"),
                    });
                }
                alpn_wire.push(proto.len() as u8);
                alpn_wire.extend_from_slice(proto.as_bytes());
            }
            builder.set_alpn_protos(&alpn_wire).map_err(protocol_error)?;
        }

        for root in &self.root_certificates {
            builder
                .cert_store_mut()
                .add_cert(root.clone())
                .map_err(protocol_error)?;
        }

        match self.verification {
            CertVerification::ChainAndPin => builder.set_verify(SslVerifyMode::PEER),
            CertVerification::PinOnlyInsecure => builder.set_verify(SslVerifyMode::NONE),
        }

        Ok(())
    }

    /// Check if SNI should be set for this host.
    /// Per RFC 6066, SNI MUST NOT be set for raw IP addresses.
    pub fn should_set_sni(host: &str) -> bool {
        host.parse::<std::net::IpAddr>().is_err()
    }
}

fn protocol_error(e: boring::error::ErrorStack) -> NetError {
    NetError::SslProtocolError {
        reason: e.to_string(),
    }
}
