//! # keypin
//!
//! Outbound TLS connections with public key pinning, on BoringSSL.
//!
//! A connection is handed back only when at least one certificate the peer
//! presents carries a public key whose SPKI SHA-256 hash is in a
//! pre-configured [`FingerprintSet`]. This binds trust to specific keys rather
//! than to the certificate authority hierarchy alone.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use keypin::{FingerprintSet, PinningConnector, TlsConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), keypin::NetError> {
//!     let pins = FingerprintSet::from_base64([
//!         "sha256/s+xUlcaUY3JfY6ABjSAQDdUXlkUUtgDghW6SdU7Gwgs=",
//!     ])?;
//!     let connector = PinningConnector::new(pins, TlsConfig::default())?;
//!     let stream = connector.connect("tcp", "www.google.com:443").await?;
//!     println!("pinned on certificate #{}", stream.pin_match().index);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions
//! - [`tls`] - Fingerprints, fingerprint sets and chain scanning
//! - [`socket`] - TLS configuration, dialing and the pinned stream
//! - [`config`] - JSON configuration
//!
//! ## Errors
//!
//! [`NetError::kind`] separates connectivity and handshake failures from
//! [`ErrorKind::PinMismatch`], which means a peer completed the handshake
//! without presenting a pinned key and may indicate interception.

pub mod base;
pub mod config;
pub mod socket;
pub mod tls;

pub use base::{ErrorKind, NetError};
pub use config::PinningConfig;
pub use socket::{CertVerification, Network, PinnedStream, PinningConnector, TlsConfig};
pub use tls::{spki_hash, Fingerprint, FingerprintSet, PinMatch};
