//! Network kinds and `host:port` parsing for outbound dials.

use crate::base::neterror::NetError;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

/// Transport family to dial over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    /// TCP over IPv4 or IPv6.
    Tcp,
    Tcp4,
    Tcp6,
}

impl Network {
    /// Whether a resolved address belongs to this network.
    pub fn accepts(&self, addr: &SocketAddr) -> bool {
        match self {
            Network::Tcp => true,
            Network::Tcp4 => addr.is_ipv4(),
            Network::Tcp6 => addr.is_ipv6(),
        }
    }
}

impl FromStr for Network {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Network::Tcp),
            "tcp4" => Ok(Network::Tcp4),
            "tcp6" => Ok(Network::Tcp6),
            _ => Err(NetError::UnknownNetwork {
                network: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Tcp => "tcp",
            Network::Tcp4 => "tcp4",
            Network::Tcp6 => "tcp6",
        };
        f.write_str(name)
    }
}

/// Split `host:port`. IPv6 literals must be bracketed (`[::1]:443`).
pub fn split_host_port(address: &str) -> Result<(&str, u16), NetError> {
    let invalid = || NetError::AddressInvalid {
        address: address.to_string(),
    };

    let (host, port) = address.rsplit_once(':').ok_or_else(invalid)?;
    let host = match host.strip_prefix('[') {
        Some(rest) => rest.strip_suffix(']').ok_or_else(invalid)?,
        // An unbracketed colon means a bare IPv6 literal without a port.
        None if host.contains(':') => return Err(invalid()),
        None => host,
    };

    if host.is_empty() {
        return Err(invalid());
    }
    let port = port.parse::<u16>().map_err(|_| invalid())?;
    Ok((host, port))
}
