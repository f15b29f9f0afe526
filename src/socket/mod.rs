//! Socket and connection management.
//!
//! - [`connectjob`]: DNS → TCP → TLS → pin check connection flow
//! - [`network`]: Network kinds and address parsing
//! - [`stream`]: The pinned stream returned to callers
//! - [`tls`]: TLS configuration with BoringSSL

pub mod connectjob;
pub mod network;
pub mod stream;
pub mod tls;

pub use connectjob::PinningConnector;
pub use network::Network;
pub use stream::PinnedStream;
pub use tls::{CertVerification, TlsConfig};
