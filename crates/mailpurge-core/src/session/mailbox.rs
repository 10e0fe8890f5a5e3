//! One account's purge: connect, authenticate, list, delete, commit.

use std::time::Duration;

use mailpurge_pop3::{Authorization, Client, Transaction};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tracing::debug;

use super::connector::Connector;
use super::state::{FailureKind, SessionError, SessionResult, SessionState};
use crate::account::{Account, Credential};
use crate::report::{Reporter, SessionEvent};

/// A connection still owned by the session, awaiting teardown.
enum OpenConnection<S> {
    Authorization(Client<S, Authorization>),
    Transaction(Client<S, Transaction>),
}

impl<S> OpenConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    async fn close(self) -> mailpurge_pop3::Result<()> {
        match self {
            Self::Authorization(client) => client.quit().await,
            Self::Transaction(client) => client.quit().await,
        }
    }
}

/// Drives one account through the POP3 purge.
///
/// The session owns its connection by value. Whatever step fails, the
/// connection is closed with a best-effort `QUIT` and then dropped before
/// [`MailboxSession::run`] returns; errors from that close are discarded.
pub struct MailboxSession<'a, C: Connector> {
    account: &'a Account,
    connector: &'a C,
    timeout: Duration,
    state: SessionState,
    open: Option<OpenConnection<C::Stream>>,
}

impl<'a, C: Connector> MailboxSession<'a, C> {
    /// Creates a session for an account.
    ///
    /// `timeout` bounds the connect and every later read and write.
    #[must_use]
    pub const fn new(account: &'a Account, connector: &'a C, timeout: Duration) -> Self {
        Self {
            account,
            connector,
            timeout,
            state: SessionState::Disconnected,
            open: None,
        }
    }

    /// Runs the session to completion and returns the deleted count.
    ///
    /// Without a credential the server is never contacted.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] describing the first failing step. The
    /// connection is closed either way.
    pub async fn run(
        mut self,
        credential: Option<&Credential>,
        reporter: &mut dyn Reporter,
    ) -> SessionResult {
        let result = match credential {
            Some(credential) => self.drive(credential, reporter).await,
            None => Err(SessionError::new(
                FailureKind::MissingCredential,
                "no password in environment or account file",
            )),
        };

        if let Err(err) = &result {
            self.transition(SessionState::Failed(err.kind));
        }

        self.teardown().await;
        result
    }

    async fn drive(&mut self, credential: &Credential, reporter: &mut dyn Reporter) -> SessionResult {
        let account = self.account;

        reporter.on_event(
            account,
            &SessionEvent::Connecting {
                server: account.server.clone(),
                port: account.port,
            },
        );
        let client = self.connect().await?;
        self.transition(SessionState::Connected);
        reporter.on_event(account, &SessionEvent::Connected);

        let mut client = match client.login(&account.email, credential.expose()).await {
            Ok(client) => client,
            Err((err, client)) => {
                self.open = Some(OpenConnection::Authorization(client));
                return Err(SessionError::from_pop3(&err, FailureKind::AuthError));
            }
        };
        self.transition(SessionState::Authenticated);
        reporter.on_event(account, &SessionEvent::Authenticated);

        let count = match self.purge(&mut client, reporter).await {
            Ok(count) => count,
            Err(err) => {
                self.open = Some(OpenConnection::Transaction(client));
                return Err(err);
            }
        };

        // QUIT in the transaction state applies every DELE
        client
            .quit()
            .await
            .map_err(|err| SessionError::from_pop3(&err, FailureKind::ProtocolError))?;
        self.transition(SessionState::Committed);
        reporter.on_event(account, &SessionEvent::Deleted(count));

        Ok(count)
    }

    async fn connect(&self) -> Result<Client<C::Stream, Authorization>, SessionError> {
        let account = self.account;
        let stream = timeout(
            self.timeout,
            self.connector.connect(&account.server, account.port),
        )
        .await
        .map_err(|_| {
            SessionError::new(
                FailureKind::Timeout,
                format!(
                    "connecting to {}:{} timed out after {}s",
                    account.server,
                    account.port,
                    self.timeout.as_secs()
                ),
            )
        })?
        .map_err(|err| SessionError::from_pop3(&err, FailureKind::ConnectError))?;

        Client::from_stream(stream, self.timeout)
            .await
            .map_err(|err| SessionError::from_pop3(&err, FailureKind::ConnectError))
    }

    /// Enumerates, then marks messages 1..=N. Returns N.
    async fn purge(
        &mut self,
        client: &mut Client<C::Stream, Transaction>,
        reporter: &mut dyn Reporter,
    ) -> SessionResult {
        let entries = client
            .list()
            .await
            .map_err(|err| SessionError::from_pop3(&err, FailureKind::ProtocolError))?;
        let count = entries.len();
        self.transition(SessionState::Enumerated);
        reporter.on_event(self.account, &SessionEvent::MessagesFound(count));

        if count == 0 {
            return Ok(0);
        }

        let last = u32::try_from(count).map_err(|_| {
            SessionError::new(FailureKind::ProtocolError, format!("listing too large: {count}"))
        })?;

        self.transition(SessionState::Deleting);
        for index in 1..=last {
            client
                .dele(index)
                .await
                .map_err(|err| SessionError::from_pop3(&err, FailureKind::ProtocolError))?;
        }

        Ok(count)
    }

    /// Best-effort close of whatever connection is still open, then `Closed`.
    async fn teardown(&mut self) {
        if let Some(open) = self.open.take() {
            if let Err(err) = open.close().await {
                debug!(account = %self.account.email, error = %err, "ignoring error during close");
            }
        }
        self.transition(SessionState::Closed);
    }

    fn transition(&mut self, to: SessionState) {
        debug!(account = %self.account.email, from = ?self.state, to = ?to, "session state");
        self.state = to;
    }
}
