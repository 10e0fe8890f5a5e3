//! Type-state POP3 client.

use std::marker::PhantomData;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tracing::debug;

use super::FramedStream;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_terminator, parse_list_entry, parse_stat, parse_status_line, unstuff};
use crate::types::{ListEntry, MailboxStat, Reply, Status};

/// Upper bound on data lines in one multi-line reply.
const MAX_REPLY_LINES: usize = 1 << 20;

/// Type-state marker for the AUTHORIZATION state (greeting received).
#[derive(Debug)]
pub struct Authorization;

/// Type-state marker for the TRANSACTION state (logged in).
#[derive(Debug)]
pub struct Transaction;

/// POP3 client with type-state pattern.
pub struct Client<S, State> {
    stream: FramedStream<S>,
    greeting: String,
    _state: PhantomData<State>,
}

impl<S, State> std::fmt::Debug for Client<S, State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("greeting", &self.greeting)
            .finish_non_exhaustive()
    }
}

impl<S> Client<S, Authorization>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a client from a connected stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting cannot be read or is `-ERR`.
    pub async fn from_stream(stream: S, io_timeout: Duration) -> Result<Self> {
        let mut stream = FramedStream::new(stream, io_timeout);
        let line = stream.read_line().await?;
        let greeting = parse_status_line(&line)?;

        if !greeting.is_ok() {
            return Err(Error::negative("greeting", greeting.text));
        }

        debug!(greeting = %greeting.text, "POP3 server ready");

        Ok(Self {
            stream,
            greeting: greeting.text,
            _state: PhantomData,
        })
    }

    /// Authenticates with `USER` and `PASS`.
    ///
    /// Consumes self and returns a client in the transaction state. On
    /// failure the error is returned together with the unchanged client so
    /// the caller can still close the connection politely.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Negative`] if either command is rejected, or an I/O,
    /// timeout or protocol error.
    #[allow(clippy::result_large_err)]
    pub async fn login(
        mut self,
        username: &str,
        password: &str,
    ) -> std::result::Result<Client<S, Transaction>, (Error, Self)> {
        if let Err(err) = self.authenticate(username, password).await {
            return Err((err, self));
        }

        Ok(Client {
            stream: self.stream,
            greeting: self.greeting,
            _state: PhantomData,
        })
    }

    async fn authenticate(&mut self, username: &str, password: &str) -> Result<()> {
        self.send_command(Command::User {
            name: username.to_string(),
        })
        .await?;
        self.send_command(Command::Pass {
            secret: password.to_string(),
        })
        .await?;
        Ok(())
    }
}

impl<S> Client<S, Transaction>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Returns the message count and maildrop size.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or the reply is malformed.
    pub async fn stat(&mut self) -> Result<MailboxStat> {
        let reply = self.send_command(Command::Stat).await?;
        parse_stat(&reply.text)
    }

    /// Returns the scan listing of every message in the maildrop.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or any entry is malformed.
    pub async fn list(&mut self) -> Result<Vec<ListEntry>> {
        let reply = self.send_command(Command::List).await?;
        reply.lines.iter().map(|line| parse_list_entry(line)).collect()
    }

    /// Marks a message for deletion. Nothing is removed until [`Client::quit`].
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the message number.
    pub async fn dele(&mut self, index: u32) -> Result<()> {
        self.send_command(Command::Dele { index }).await?;
        Ok(())
    }

    /// Sends a NOOP.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn noop(&mut self) -> Result<()> {
        self.send_command(Command::Noop).await?;
        Ok(())
    }

    /// Unmarks every message marked for deletion in this session.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn rset(&mut self) -> Result<()> {
        self.send_command(Command::Rset).await?;
        Ok(())
    }
}

// Common implementation for all states
impl<S, State> Client<S, State>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Returns the text of the server greeting.
    #[must_use]
    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    /// Returns the I/O timeout applied to every read and write.
    #[must_use]
    pub const fn io_timeout(&self) -> Duration {
        self.stream.io_timeout()
    }

    async fn send_command(&mut self, cmd: Command) -> Result<Reply> {
        debug!(command = ?cmd, "sending");
        self.stream.write_command(&cmd.serialize()).await?;

        let line = self.stream.read_line().await?;
        let mut reply = parse_status_line(&line)?;

        if reply.status == Status::Err {
            return Err(Error::negative(cmd.keyword(), reply.text));
        }

        if cmd.is_multiline() {
            reply.lines = self.read_multiline().await?;
        }

        Ok(reply)
    }

    /// Reads data lines up to the terminator. The whole body shares one
    /// I/O timeout, so a server trickling lines cannot stretch the read.
    async fn read_multiline(&mut self) -> Result<Vec<String>> {
        let limit = self.stream.io_timeout();
        let body = async {
            let mut lines = Vec::new();
            loop {
                let line = self.stream.read_line().await?;
                if is_terminator(&line) {
                    return Ok(lines);
                }
                if lines.len() >= MAX_REPLY_LINES {
                    return Err(Error::Protocol(format!(
                        "multi-line reply exceeds {MAX_REPLY_LINES} lines"
                    )));
                }
                lines.push(unstuff(&line).to_string());
            }
        };

        timeout(limit, body)
            .await
            .map_err(|_| Error::Timeout(limit))?
    }

    /// Sends QUIT and closes the connection (available in any state).
    ///
    /// In the transaction state this is the commit: the server removes every
    /// message marked with DELE before answering `+OK`.
    ///
    /// # Errors
    ///
    /// Returns an error if QUIT is rejected or the connection fails.
    pub async fn quit(mut self) -> Result<()> {
        self.send_command(Command::Quit).await?;
        // Server closes after +OK; a failed close_notify changes nothing.
        let _ = self.stream.shutdown().await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio_test::io::Builder;
    use tokio_test::{assert_err, assert_ok};

    const LIMIT: Duration = Duration::from_secs(60);

    fn session_prefix(builder: &mut Builder) -> &mut Builder {
        builder
            .read(b"+OK POP3 ready\r\n")
            .write(b"USER user@example.com\r\n")
            .read(b"+OK\r\n")
            .write(b"PASS secret\r\n")
            .read(b"+OK logged in\r\n")
    }

    #[tokio::test]
    async fn test_greeting() {
        let mock = Builder::new().read(b"+OK POP3 ready <1896.697170952@dbc>\r\n").build();
        let client = Client::from_stream(mock, LIMIT).await.unwrap();
        assert_eq!(client.greeting(), "POP3 ready <1896.697170952@dbc>");
        assert_eq!(client.io_timeout(), LIMIT);
    }

    #[tokio::test]
    async fn test_negative_greeting() {
        let mock = Builder::new().read(b"-ERR too busy\r\n").build();
        let err = Client::from_stream(mock, LIMIT).await.unwrap_err();
        assert!(err.is_negative());
    }

    #[tokio::test]
    async fn test_login_list_dele_quit() {
        let mock = session_prefix(&mut Builder::new())
            .write(b"LIST\r\n")
            .read(b"+OK 2 messages\r\n1 120\r\n2 200\r\n.\r\n")
            .write(b"DELE 1\r\n")
            .read(b"+OK message 1 deleted\r\n")
            .write(b"DELE 2\r\n")
            .read(b"+OK message 2 deleted\r\n")
            .write(b"QUIT\r\n")
            .read(b"+OK bye\r\n")
            .build();

        let client = Client::from_stream(mock, LIMIT).await.unwrap();
        let mut client = client.login("user@example.com", "secret").await.unwrap();

        let entries = client.list().await.unwrap();
        assert_eq!(
            entries,
            vec![
                ListEntry { index: 1, size: 120 },
                ListEntry { index: 2, size: 200 }
            ]
        );

        assert_ok!(client.dele(1).await);
        assert_ok!(client.dele(2).await);
        assert_ok!(client.quit().await);
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let mock = session_prefix(&mut Builder::new())
            .write(b"LIST\r\n")
            .read(b"+OK 0 messages\r\n.\r\n")
            .build();

        let client = Client::from_stream(mock, LIMIT).await.unwrap();
        let mut client = client.login("user@example.com", "secret").await.unwrap();
        assert!(client.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_listing() {
        let mock = session_prefix(&mut Builder::new())
            .write(b"LIST\r\n")
            .read(b"+OK\r\ngarbage\r\n.\r\n")
            .build();

        let client = Client::from_stream(mock, LIMIT).await.unwrap();
        let mut client = client.login("user@example.com", "secret").await.unwrap();
        let err = assert_err!(client.list().await);
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn test_stat() {
        let mock = session_prefix(&mut Builder::new())
            .write(b"STAT\r\n")
            .read(b"+OK 2 320\r\n")
            .build();

        let client = Client::from_stream(mock, LIMIT).await.unwrap();
        let mut client = client.login("user@example.com", "secret").await.unwrap();
        let stat = client.stat().await.unwrap();
        assert_eq!(stat, MailboxStat { count: 2, size: 320 });
    }

    #[tokio::test]
    async fn test_rejected_password_returns_client() {
        let mock = Builder::new()
            .read(b"+OK POP3 ready\r\n")
            .write(b"USER user@example.com\r\n")
            .read(b"+OK\r\n")
            .write(b"PASS wrong\r\n")
            .read(b"-ERR [AUTH] invalid credentials\r\n")
            .write(b"QUIT\r\n")
            .read(b"+OK bye\r\n")
            .build();

        let client = Client::from_stream(mock, LIMIT).await.unwrap();
        let (err, client) = client.login("user@example.com", "wrong").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Negative { command: "PASS", ref message } if message == "[AUTH] invalid credentials"
        ));
        assert_ok!(client.quit().await);
    }

    #[tokio::test]
    async fn test_rejected_dele() {
        let mock = session_prefix(&mut Builder::new())
            .write(b"DELE 9\r\n")
            .read(b"-ERR no such message\r\n")
            .write(b"RSET\r\n")
            .read(b"+OK\r\n")
            .build();

        let client = Client::from_stream(mock, LIMIT).await.unwrap();
        let mut client = client.login("user@example.com", "secret").await.unwrap();
        let err = assert_err!(client.dele(9).await);
        assert!(matches!(err, Error::Negative { command: "DELE", .. }));
        assert_ok!(client.rset().await);
    }

    #[tokio::test]
    async fn test_noop() {
        let mock = session_prefix(&mut Builder::new())
            .write(b"NOOP\r\n")
            .read(b"+OK\r\n")
            .build();

        let client = Client::from_stream(mock, LIMIT).await.unwrap();
        let mut client = client.login("user@example.com", "secret").await.unwrap();
        assert_ok!(client.noop().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_server_times_out() {
        let mock = Builder::new()
            .read(b"+OK POP3 ready\r\n")
            .write(b"USER user@example.com\r\n")
            .wait(Duration::from_secs(600))
            .build();

        let client = Client::from_stream(mock, LIMIT).await.unwrap();
        let (err, _client) = client.login("user@example.com", "secret").await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_trickled_listing_is_bounded_as_a_whole() {
        let limit = Duration::from_secs(5);
        let (local, mut remote) = tokio::io::duplex(4096);
        tokio::spawn(async move {
            let replies = b"+OK POP3 ready\r\n+OK\r\n+OK logged in\r\n+OK 100 messages\r\n";
            if remote.write_all(replies).await.is_err() {
                return;
            }
            // Each line lands inside the per-line timeout, never the terminator
            for i in 1..=100 {
                tokio::time::sleep(Duration::from_secs(4)).await;
                if remote.write_all(format!("{i} 10\r\n").as_bytes()).await.is_err() {
                    return;
                }
            }
        });

        let client = Client::from_stream(local, limit).await.unwrap();
        let mut client = client.login("user@example.com", "secret").await.unwrap();

        let started = tokio::time::Instant::now();
        let err = assert_err!(client.list().await);
        assert!(err.is_timeout());
        assert!(started.elapsed() <= limit + Duration::from_secs(1));
    }
}
