//! Test doubles: an in-process POP3 server, a connector that reaches it, and
//! a reporter that records everything it is told.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, DuplexStream, ReadBuf,
};

use mailpurge_core::{Account, Connector, Reporter, RunSummary, SessionEvent};

/// Point in the dialogue where the fake server stops answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stall {
    Greeting,
    Command(&'static str),
}

#[derive(Debug, Default)]
struct MailboxState {
    messages: Vec<u64>,
    password: String,
    fail_dele_at: Option<u32>,
    fail_quit: bool,
    malformed_list: bool,
    reject_greeting: bool,
    trickle_list: Option<Duration>,
    stall: Option<Stall>,
    transcript: Vec<String>,
}

/// A maildrop shared between the test and every connection to it.
#[derive(Debug, Clone, Default)]
pub struct Mailbox(Arc<Mutex<MailboxState>>);

impl Mailbox {
    pub fn new(password: &str, sizes: &[u64]) -> Self {
        Self(Arc::new(Mutex::new(MailboxState {
            messages: sizes.to_vec(),
            password: password.to_string(),
            ..MailboxState::default()
        })))
    }

    pub fn with_messages(password: &str, count: usize) -> Self {
        let sizes: Vec<u64> = (1..=count as u64).map(|i| 1000 + i).collect();
        Self::new(password, &sizes)
    }

    pub fn fail_dele_at(self, index: u32) -> Self {
        self.0.lock().unwrap().fail_dele_at = Some(index);
        self
    }

    pub fn fail_quit(self) -> Self {
        self.0.lock().unwrap().fail_quit = true;
        self
    }

    pub fn malformed_list(self) -> Self {
        self.0.lock().unwrap().malformed_list = true;
        self
    }

    pub fn reject_greeting(self) -> Self {
        self.0.lock().unwrap().reject_greeting = true;
        self
    }

    /// Sends each `LIST` entry after `interval`, never the terminator.
    pub fn trickle_list(self, interval: Duration) -> Self {
        self.0.lock().unwrap().trickle_list = Some(interval);
        self
    }

    pub fn stall(self, at: Stall) -> Self {
        self.0.lock().unwrap().stall = Some(at);
        self
    }

    pub fn message_count(&self) -> usize {
        self.0.lock().unwrap().messages.len()
    }

    /// Commands received, PASS arguments masked.
    pub fn transcript(&self) -> Vec<String> {
        self.0.lock().unwrap().transcript.clone()
    }

    pub fn received(&self, verb: &str) -> usize {
        self.transcript()
            .iter()
            .filter(|line| line.split(' ').next() == Some(verb))
            .count()
    }

    fn record(&self, line: &str) {
        let entry = if line.starts_with("PASS ") {
            "PASS ***".to_string()
        } else {
            line.to_string()
        };
        self.0.lock().unwrap().transcript.push(entry);
    }
}

/// Speaks the server side of POP3 over one connection.
async fn serve(stream: DuplexStream, mailbox: Mailbox) -> io::Result<()> {
    let (read, mut write) = tokio::io::split(stream);
    let mut lines = BufReader::new(read).lines();

    let (stall, reject_greeting, trickle_list) = {
        let state = mailbox.0.lock().unwrap();
        (state.stall, state.reject_greeting, state.trickle_list)
    };
    if stall == Some(Stall::Greeting) {
        return drain(&mut lines, &mailbox).await;
    }
    if reject_greeting {
        write.write_all(b"-ERR server busy\r\n").await?;
        return drain(&mut lines, &mailbox).await;
    }
    write.write_all(b"+OK POP3 server ready\r\n").await?;

    let mut authenticated = false;
    let mut marked: Vec<u32> = Vec::new();

    while let Some(line) = lines.next_line().await? {
        mailbox.record(&line);
        let (verb, arg) = line.split_once(' ').unwrap_or((line.as_str(), ""));
        let verb = verb.to_ascii_uppercase();

        if matches!(stall, Some(Stall::Command(at)) if at == verb) {
            return drain(&mut lines, &mailbox).await;
        }

        if let (Some(interval), "LIST", true) = (trickle_list, verb.as_str(), authenticated) {
            write.write_all(b"+OK scan listing follows\r\n").await?;
            for i in 1..=1000 {
                tokio::time::sleep(interval).await;
                write.write_all(format!("{i} 100\r\n").as_bytes()).await?;
            }
            return Ok(());
        }

        let reply = {
            let mut state = mailbox.0.lock().unwrap();
            match verb.as_str() {
                "USER" if !authenticated => "+OK send PASS\r\n".to_string(),
                "PASS" if !authenticated => {
                    if arg == state.password {
                        authenticated = true;
                        "+OK maildrop locked and ready\r\n".to_string()
                    } else {
                        "-ERR invalid password\r\n".to_string()
                    }
                }
                "STAT" if authenticated => {
                    let total: u64 = state.messages.iter().sum();
                    format!("+OK {} {total}\r\n", state.messages.len())
                }
                "LIST" if authenticated => {
                    let total: u64 = state.messages.iter().sum();
                    let mut reply =
                        format!("+OK {} messages ({total} octets)\r\n", state.messages.len());
                    if state.malformed_list {
                        reply.push_str("one 120\r\n");
                    }
                    for (i, size) in state.messages.iter().enumerate() {
                        reply.push_str(&format!("{} {size}\r\n", i + 1));
                    }
                    reply.push_str(".\r\n");
                    reply
                }
                "DELE" if authenticated => match arg.parse::<u32>() {
                    Ok(index) if state.fail_dele_at == Some(index) => {
                        "-ERR message locked\r\n".to_string()
                    }
                    Ok(index)
                        if index >= 1
                            && index as usize <= state.messages.len()
                            && !marked.contains(&index) =>
                    {
                        marked.push(index);
                        format!("+OK message {index} deleted\r\n")
                    }
                    _ => "-ERR no such message\r\n".to_string(),
                },
                "NOOP" if authenticated => "+OK\r\n".to_string(),
                "RSET" if authenticated => {
                    marked.clear();
                    "+OK\r\n".to_string()
                }
                "QUIT" if authenticated && state.fail_quit => {
                    "-ERR some deleted messages not removed\r\n".to_string()
                }
                "QUIT" => {
                    if authenticated {
                        marked.sort_unstable();
                        for index in marked.iter().rev() {
                            state.messages.remove(*index as usize - 1);
                        }
                    }
                    "+OK bye\r\n".to_string()
                }
                _ => "-ERR command not valid in this state\r\n".to_string(),
            }
        };

        write.write_all(reply.as_bytes()).await?;
        if verb == "QUIT" {
            break;
        }
    }

    write.shutdown().await
}

/// Swallows input without answering until the client hangs up.
async fn drain<R>(lines: &mut tokio::io::Lines<R>, mailbox: &Mailbox) -> io::Result<()>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    while let Some(line) = lines.next_line().await? {
        mailbox.record(&line);
    }
    Ok(())
}

/// Client end of a fake connection. Counts itself as open until dropped.
pub struct TrackedStream {
    inner: DuplexStream,
    open: Arc<AtomicUsize>,
}

impl TrackedStream {
    fn new(inner: DuplexStream, open: Arc<AtomicUsize>) -> Self {
        open.fetch_add(1, Ordering::SeqCst);
        Self { inner, open }
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AsyncRead for TrackedStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for TrackedStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

/// How a host answers a connection attempt.
#[derive(Debug, Clone)]
pub enum Host {
    Accept(Mailbox),
    Refuse,
    Hang,
}

/// Connector routing hostnames to fake servers. Clones share counters.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    hosts: HashMap<String, Host>,
    connects: Arc<AtomicUsize>,
    open: Arc<AtomicUsize>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, name: &str, host: Host) -> Self {
        self.hosts.insert(name.to_string(), host);
        self
    }

    /// Connection attempts made so far.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Client streams not yet dropped.
    pub fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

impl Connector for MockConnector {
    type Stream = TrackedStream;

    fn connect(
        &self,
        server: &str,
        _port: u16,
    ) -> impl Future<Output = mailpurge_pop3::Result<TrackedStream>> + Send {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let host = self.hosts.get(server).cloned();
        let open = Arc::clone(&self.open);

        async move {
            match host {
                Some(Host::Accept(mailbox)) => {
                    let (client, server) = tokio::io::duplex(8192);
                    tokio::spawn(async move {
                        let _ = serve(server, mailbox).await;
                    });
                    Ok(TrackedStream::new(client, open))
                }
                Some(Host::Hang) => {
                    std::future::pending::<mailpurge_pop3::Result<TrackedStream>>().await
                }
                Some(Host::Refuse) | None => Err(mailpurge_pop3::Error::Io(io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    "connection refused",
                ))),
            }
        }
    }
}

/// Reporter keeping every event and summary.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<(String, SessionEvent)>,
    pub summaries: Vec<RunSummary>,
}

impl RecordingReporter {
    /// Events for one account, in order.
    pub fn events_for(&self, email: &str) -> Vec<SessionEvent> {
        self.events
            .iter()
            .filter(|(account, _)| account == email)
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// Accounts in the order their sessions started.
    pub fn started(&self) -> Vec<String> {
        self.events
            .iter()
            .filter(|(_, event)| *event == SessionEvent::Started)
            .map(|(account, _)| account.clone())
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn on_event(&mut self, account: &Account, event: &SessionEvent) {
        self.events.push((account.email.clone(), event.clone()));
    }

    fn on_summary(&mut self, summary: &RunSummary) {
        self.summaries.push(summary.clone());
    }
}
