//! Stream types for POP3 connections.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tracing::debug;

use super::Config;
use crate::{Error, Result};

/// TLS-encrypted POP3 stream.
///
/// POP3 over port 995 negotiates TLS before the greeting, so there is no
/// plaintext variant.
pub struct Pop3Stream(Box<TlsStream<TcpStream>>);

impl std::fmt::Debug for Pop3Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Pop3Stream").finish_non_exhaustive()
    }
}

impl AsyncRead for Pop3Stream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut *self.get_mut().0).poll_read(cx, buf)
    }
}

impl AsyncWrite for Pop3Stream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut *self.get_mut().0).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut *self.get_mut().0).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut *self.get_mut().0).poll_shutdown(cx)
    }
}

/// Creates a TLS connector with the webpki root certificates.
#[must_use]
pub fn create_tls_connector() -> TlsConnector {
    let root_store = rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}

/// Connects to a POP3 server with TLS from the start.
///
/// TCP connect and TLS handshake together are bounded by
/// `config.connect_timeout`.
///
/// # Errors
///
/// Returns [`Error::Timeout`] if the bound elapses, or an I/O, TLS or DNS
/// name error if the connection cannot be established.
pub async fn connect_tls(config: &Config) -> Result<Pop3Stream> {
    let handshake = async {
        let addr = format!("{}:{}", config.host, config.port);
        let tcp = TcpStream::connect(&addr).await?;
        debug!(%addr, "TCP connected, starting TLS handshake");

        let connector = create_tls_connector();
        let server_name = ServerName::try_from(config.host.clone())?;
        let tls = connector.connect(server_name, tcp).await?;
        Ok::<_, Error>(Pop3Stream(Box::new(tls)))
    };

    timeout(config.connect_timeout, handshake)
        .await
        .map_err(|_| Error::Timeout(config.connect_timeout))?
}
