//! The connection handed back to callers after a successful pin check.
//!
//! [`PinnedStream`] owns the TLS stream and records which certificate in the
//! peer's chain satisfied the pin set. It is only ever constructed by the
//! connector once the check has passed, so holding one means the peer
//! presented a pinned key.

use crate::tls::pinning::PinMatch;
use boring::ssl::SslRef;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_boring::SslStream;

/// A TLS stream whose peer presented a pinned public key.
pub struct PinnedStream<S = TcpStream> {
    inner: SslStream<S>,
    pin: PinMatch,
}

impl<S> PinnedStream<S> {
    pub(crate) fn new(inner: SslStream<S>, pin: PinMatch) -> Self {
        Self { inner, pin }
    }

    /// The certificate that matched the pin set.
    pub fn pin_match(&self) -> &PinMatch {
        &self.pin
    }

    /// Negotiated TLS session state.
    pub fn ssl(&self) -> &SslRef {
        self.inner.ssl()
    }

    /// Negotiated ALPN protocol, if any.
    pub fn alpn_protocol(&self) -> Option<&[u8]> {
        self.inner.ssl().selected_alpn_protocol()
    }

    pub fn get_ref(&self) -> &S {
        self.inner.get_ref()
    }

    pub fn into_inner(self) -> SslStream<S> {
        self.inner
    }
}

impl<S> std::fmt::Debug for PinnedStream<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinnedStream")
            .field("pin", &self.pin)
            .field("version", &self.inner.ssl().version_str())
            .finish()
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> AsyncRead for PinnedStream<S> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> AsyncWrite for PinnedStream<S> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}
