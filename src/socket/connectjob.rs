use crate::base::neterror::NetError;
use crate::socket::network::{split_host_port, Network};
use crate::socket::stream::PinnedStream;
use crate::socket::tls::{CertVerification, TlsConfig};
use crate::tls::pinning::{FingerprintSet, PinMatch};
use boring::ssl::{SslConnector, SslMethod, SslRef};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

/// Dials TLS connections that must present a pinned public key.
///
/// Manages the connection process: DNS -> TCP -> TLS -> pin check. Every
/// attempt is independent; the connector holds only immutable state and can
/// be shared across tasks. No retries are performed.
#[derive(Clone)]
pub struct PinningConnector {
    pins: Arc<FingerprintSet>,
    tls: TlsConfig,
    connector: SslConnector,
}

impl std::fmt::Debug for PinningConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinningConnector")
            .field("pins", &self.pins.len())
            .field("verification", &self.tls.verification())
            .finish()
    }
}

impl PinningConnector {
    pub fn new(pins: FingerprintSet, tls: TlsConfig) -> Result<Self, NetError> {
        let mut builder =
            SslConnector::builder(SslMethod::tls()).map_err(|e| NetError::SslProtocolError {
                reason: e.to_string(),
            })?;
        tls.apply_to_builder(&mut builder)?;

        if pins.is_empty() {
            tracing::warn!("pin set is empty; every connection will be rejected");
        }
        if tls.verification() == CertVerification::PinOnlyInsecure {
            tracing::warn!("certificate chain validation disabled; relying on pins alone");
        }

        Ok(Self {
            pins: Arc::new(pins),
            tls,
            connector: builder.build(),
        })
    }

    pub fn pins(&self) -> &FingerprintSet {
        &self.pins
    }

    pub fn tls_config(&self) -> &TlsConfig {
        &self.tls
    }

    /// Dial `address` (`host:port`) over `network` (`tcp`, `tcp4` or `tcp6`),
    /// perform the TLS handshake and require a pinned key in the peer chain.
    ///
    /// The returned future owns the socket; dropping it cancels the attempt
    /// and closes the socket. `TlsConfig::connect_timeout` bounds the whole
    /// attempt when set.
    pub async fn connect(&self, network: &str, address: &str) -> Result<PinnedStream, NetError> {
        let network: Network = network.parse()?;
        let (host, port) = split_host_port(address)?;

        let attempt = async {
            let tcp = Self::dial(network, host, port).await?;
            self.connect_stream(host, tcp).await
        };

        match self.tls.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, attempt).await.map_err(|_| {
                tracing::debug!(%address, ?limit, "connect timed out");
                NetError::ConnectionTimedOut
            })?,
            None => attempt.await,
        }
    }

    /// Run the TLS handshake and pin check over an already-established
    /// transport, e.g. a proxy tunnel. `host` drives SNI and, when chain
    /// validation is on, hostname verification.
    pub async fn connect_stream<S>(
        &self,
        host: &str,
        stream: S,
    ) -> Result<PinnedStream<S>, NetError>
    where
        S: AsyncRead + AsyncWrite + Unpin + std::fmt::Debug,
    {
        let mut config = self
            .connector
            .configure()
            .map_err(|e| NetError::SslProtocolError {
                reason: e.to_string(),
            })?;
        if !TlsConfig::should_set_sni(host) {
            config.set_use_server_name_indication(false);
        }
        if !self.tls.verification().verifies_chain() {
            config.set_verify_hostname(false);
        }

        let mut tls_stream = tokio_boring::connect(config, host, stream).await.map_err(|e| {
            tracing::debug!(%host, error = %e, "TLS handshake failed");
            NetError::SslHandshakeFailed {
                reason: e.to_string(),
            }
        })?;

        let outcome = self.check_peer(tls_stream.ssl());
        match outcome {
            Ok(pin) => {
                tracing::debug!(%host, index = pin.index, "peer chain pinned");
                Ok(PinnedStream::new(tls_stream, pin))
            }
            Err(err) => {
                tracing::warn!(%host, error = %err, "rejecting TLS peer");
                // Close before dropping so the half-trusted session is never usable.
                if let Err(e) = AsyncWriteExt::shutdown(&mut tls_stream).await {
                    tracing::debug!(%host, error = %e, "shutdown after rejection failed");
                }
                drop(tls_stream);
                Err(err)
            }
        }
    }

    fn check_peer(&self, ssl: &SslRef) -> Result<PinMatch, NetError> {
        match ssl.peer_cert_chain() {
            Some(chain) if !chain.is_empty() => self.pins.check_chain(chain),
            _ => match ssl.peer_certificate() {
                Some(leaf) => self.pins.check_chain(std::iter::once(&*leaf)),
                None => Err(NetError::SslPinnedKeyNotInCertChain),
            },
        }
    }

    async fn dial(network: Network, host: &str, port: u16) -> Result<TcpStream, NetError> {
        let addrs = tokio::net::lookup_host((host, port)).await.map_err(|e| {
            tracing::debug!(%host, error = %e, "DNS resolution failed");
            NetError::NameNotResolved {
                host: host.to_string(),
            }
        })?;

        // No address of the requested family counts as unresolved.
        let mut last_err = None;
        for addr in addrs.filter(|a| network.accepts(a)) {
            tracing::debug!(%addr, %network, "dialing");
            match TcpStream::connect(addr).await {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    tracing::debug!(%addr, error = %e, "TCP connect failed");
                    last_err = Some(NetError::from_io(&e));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| NetError::NameNotResolved {
            host: host.to_string(),
        }))
    }
}
