//! Framed I/O for the POP3 protocol.
//!
//! POP3 is line-based: every reply starts with a status line and
//! multi-line replies end with a lone `.`. Every read and write here is
//! bounded by the I/O timeout so a stalled server can never hang a caller.

use std::io;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::timeout;

use crate::{Error, Result};

/// Default buffer size for reading.
const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Maximum line length; RFC 1939 caps replies at 512 octets but servers
/// are sloppy.
const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Framed connection for the POP3 protocol.
pub struct FramedStream<S> {
    reader: BufReader<S>,
    write_buffer: BytesMut,
    io_timeout: Duration,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new framed stream.
    pub fn new(stream: S, io_timeout: Duration) -> Self {
        Self {
            reader: BufReader::with_capacity(DEFAULT_BUFFER_SIZE, stream),
            write_buffer: BytesMut::with_capacity(DEFAULT_BUFFER_SIZE),
            io_timeout,
        }
    }

    /// Returns the I/O timeout.
    pub const fn io_timeout(&self) -> Duration {
        self.io_timeout
    }

    /// Reads a single line, without its line terminator.
    ///
    /// CRLF is the terminator; a bare LF is accepted too.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if no complete line arrives in time, an
    /// I/O error on EOF, or a protocol error for oversized or non-UTF-8
    /// lines.
    pub async fn read_line(&mut self) -> Result<String> {
        let limit = self.io_timeout;
        timeout(limit, self.read_line_unbounded())
            .await
            .map_err(|_| Error::Timeout(limit))?
    }

    async fn read_line_unbounded(&mut self) -> Result<String> {
        let mut line = Vec::new();

        loop {
            let buf = self.reader.fill_buf().await?;
            if buf.is_empty() {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed",
                )));
            }

            let newline = buf.iter().position(|&b| b == b'\n');
            let take = newline.unwrap_or(buf.len());
            line.extend_from_slice(&buf[..take]);
            self.reader.consume(newline.map_or(take, |pos| pos + 1));

            // CR of a CRLF terminator does not count toward the limit
            let trailing_cr = newline.is_some() && line.last() == Some(&b'\r');
            if line.len() - usize::from(trailing_cr) > MAX_LINE_LENGTH {
                return Err(Error::Protocol("line too long".to_string()));
            }
            if newline.is_some() {
                break;
            }
        }

        if line.last() == Some(&b'\r') {
            line.pop();
        }

        String::from_utf8(line).map_err(|_| Error::Protocol("line is not valid UTF-8".into()))
    }

    /// Writes a command to the stream and flushes it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the write does not complete in time, or
    /// an I/O error.
    pub async fn write_command(&mut self, data: &[u8]) -> Result<()> {
        self.write_buffer.clear();
        self.write_buffer.extend_from_slice(data);

        let limit = self.io_timeout;
        let stream = self.reader.get_mut();
        let buffer = &self.write_buffer;
        let write = async {
            stream.write_all(buffer).await?;
            stream.flush().await?;
            Ok::<_, io::Error>(())
        };

        timeout(limit, write)
            .await
            .map_err(|_| Error::Timeout(limit))?
            .map_err(Error::Io)
    }

    /// Shuts down the write half (TLS `close_notify` for TLS streams).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] or an I/O error.
    pub async fn shutdown(&mut self) -> Result<()> {
        let limit = self.io_timeout;
        timeout(limit, self.reader.get_mut().shutdown())
            .await
            .map_err(|_| Error::Timeout(limit))?
            .map_err(Error::Io)
    }
}
