//! Stream establishment.

use std::future::Future;
use std::time::Duration;

use mailpurge_pop3::{Config, Pop3Stream, connect_tls};
use tokio::io::{AsyncRead, AsyncWrite};

/// Opens the byte stream a session talks POP3 over.
pub trait Connector {
    /// Connected stream type.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Connects to `server:port`.
    fn connect(
        &self,
        server: &str,
        port: u16,
    ) -> impl Future<Output = mailpurge_pop3::Result<Self::Stream>> + Send;
}

/// Connects with implicit TLS.
#[derive(Debug, Clone, Copy)]
pub struct TlsConnector {
    timeout: Duration,
}

impl TlsConnector {
    /// Creates a connector bounding connect and handshake by `timeout`.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Connector for TlsConnector {
    type Stream = Pop3Stream;

    fn connect(
        &self,
        server: &str,
        port: u16,
    ) -> impl Future<Output = mailpurge_pop3::Result<Pop3Stream>> + Send {
        let config = Config::builder(server)
            .port(port)
            .timeout(self.timeout)
            .build();
        async move { connect_tls(&config).await }
    }
}
