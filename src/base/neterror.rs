use thiserror::Error;

/// Broad classification of a [`NetError`].
///
/// Callers use this to tell "could not connect" apart from "connected to a
/// peer whose keys are not pinned", which may indicate interception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad caller input: malformed pin, address, network name or config.
    InvalidInput,
    /// The transport socket could not be established.
    Connectivity,
    /// TLS negotiation or certificate chain validation failed.
    Handshake,
    /// A presented certificate's public key could not be encoded or hashed.
    FingerprintComputation,
    /// Handshake succeeded but no presented key matched the pin set.
    PinMismatch,
}

/// Errors returned by pin parsing, configuration and connection attempts.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum NetError {
    // Input Errors
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },
    #[error("Invalid pin: {reason}")]
    InvalidPin { reason: String },
    #[error("Unknown network: {network}")]
    UnknownNetwork { network: String },
    #[error("Address invalid: {address}")]
    AddressInvalid { address: String },
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // Connection Errors
    #[error("Connection refused")]
    ConnectionRefused,
    #[error("Connection reset (TCP RST)")]
    ConnectionReset,
    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },
    #[error("Connection timed out")]
    ConnectionTimedOut,
    #[error("Name not resolved: {host}")]
    NameNotResolved { host: String },
    #[error("Address unreachable")]
    AddressUnreachable,

    // SSL Errors
    #[error("SSL protocol error: {reason}")]
    SslProtocolError { reason: String },
    #[error("SSL handshake failed: {reason}")]
    SslHandshakeFailed { reason: String },
    #[error("SSL server cert bad format: {reason}")]
    SslServerCertBadFormat { reason: String },
    #[error("SSL pinned key not in cert chain")]
    SslPinnedKeyNotInCertChain,
}

impl NetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NetError::InvalidArgument { .. }
            | NetError::InvalidPin { .. }
            | NetError::UnknownNetwork { .. }
            | NetError::AddressInvalid { .. }
            | NetError::InvalidConfig { .. } => ErrorKind::InvalidInput,

            NetError::ConnectionRefused
            | NetError::ConnectionReset
            | NetError::ConnectionFailed { .. }
            | NetError::ConnectionTimedOut
            | NetError::NameNotResolved { .. }
            | NetError::AddressUnreachable => ErrorKind::Connectivity,

            NetError::SslProtocolError { .. } | NetError::SslHandshakeFailed { .. } => {
                ErrorKind::Handshake
            }

            NetError::SslServerCertBadFormat { .. } => ErrorKind::FingerprintComputation,

            NetError::SslPinnedKeyNotInCertChain => ErrorKind::PinMismatch,
        }
    }

    /// Chromium `net_error_list.h` code for this error.
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::InvalidArgument { .. } => -4,
            NetError::InvalidPin { .. } => -4,
            NetError::UnknownNetwork { .. } => -4,
            NetError::InvalidConfig { .. } => -4,

            NetError::ConnectionReset => -101,
            NetError::ConnectionRefused => -102,
            NetError::ConnectionFailed { .. } => -104,
            NetError::NameNotResolved { .. } => -105,
            NetError::SslProtocolError { .. } => -107,
            NetError::AddressInvalid { .. } => -108,
            NetError::AddressUnreachable => -109,
            NetError::ConnectionTimedOut => -118,
            NetError::SslHandshakeFailed { .. } => -107,
            NetError::SslPinnedKeyNotInCertChain => -150,
            NetError::SslServerCertBadFormat { .. } => -167,
        }
    }

    /// Map a socket-level I/O error to a connectivity error.
    pub fn from_io(err: &std::io::Error) -> Self {
        use std::io::ErrorKind as IoKind;
        match err.kind() {
            IoKind::ConnectionRefused => NetError::ConnectionRefused,
            IoKind::ConnectionReset => NetError::ConnectionReset,
            IoKind::TimedOut => NetError::ConnectionTimedOut,
            IoKind::AddrNotAvailable => NetError::AddressUnreachable,
            _ => NetError::ConnectionFailed {
                reason: err.to_string(),
            },
        }
    }

    pub fn is_pin_mismatch(&self) -> bool {
        self.kind() == ErrorKind::PinMismatch
    }
}
