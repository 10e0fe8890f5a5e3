//! Integration tests for the cleanup run.
//!
//! Every test talks to an in-process POP3 server over an in-memory duplex
//! stream. Time is paused so timeouts elapse instantly.

#![allow(clippy::unwrap_used)]

mod common;

use std::time::Duration;

use common::{Host, Mailbox, MockConnector, RecordingReporter, Stall};
use mailpurge_core::{
    Account, Cleanup, CleanupConfig, CredentialResolver, FailureKind, RunSummary, SessionEvent,
};

const TIMEOUT: Duration = Duration::from_secs(5);

fn account(email: &str, server: &str) -> Account {
    Account::new(email, server).with_password("secret")
}

fn no_overrides() -> CredentialResolver {
    CredentialResolver::with_lookup("MAIL_PASS", |_| None)
}

async fn run_with(
    connector: &MockConnector,
    credentials: CredentialResolver,
    accounts: &[Account],
) -> (RunSummary, RecordingReporter) {
    let config = CleanupConfig::default().timeout(TIMEOUT);
    let mut cleanup = Cleanup::new(config, connector.clone(), RecordingReporter::default())
        .with_credentials(credentials);
    let summary = cleanup.run(accounts).await;
    (summary, cleanup.into_reporter())
}

async fn run(connector: &MockConnector, accounts: &[Account]) -> (RunSummary, RecordingReporter) {
    run_with(connector, no_overrides(), accounts).await
}

fn failure(reporter: &RecordingReporter, email: &str) -> Option<FailureKind> {
    reporter
        .events_for(email)
        .into_iter()
        .find_map(|event| match event {
            SessionEvent::Failed(err) => Some(err.kind),
            _ => None,
        })
}

#[tokio::test(start_paused = true)]
async fn purges_every_message_and_commits() {
    let mailbox = Mailbox::with_messages("secret", 5);
    let connector = MockConnector::new().host("pop.a.test", Host::Accept(mailbox.clone()));

    let (summary, reporter) = run(&connector, &[account("a@a.test", "pop.a.test")]).await;

    assert_eq!(summary.accounts_total, 1);
    assert_eq!(summary.accounts_succeeded, 1);
    assert_eq!(summary.messages_deleted_total, 5);
    assert_eq!(mailbox.message_count(), 0);
    assert_eq!(
        mailbox.transcript(),
        vec![
            "USER a@a.test",
            "PASS ***",
            "LIST",
            "DELE 1",
            "DELE 2",
            "DELE 3",
            "DELE 4",
            "DELE 5",
            "QUIT",
        ]
    );
    assert_eq!(connector.open(), 0);
    assert_eq!(reporter.summaries.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn events_follow_the_session() {
    let mailbox = Mailbox::with_messages("secret", 2);
    let connector = MockConnector::new().host("pop.a.test", Host::Accept(mailbox));

    let (_, reporter) = run(&connector, &[account("a@a.test", "pop.a.test")]).await;

    assert_eq!(
        reporter.events_for("a@a.test"),
        vec![
            SessionEvent::Started,
            SessionEvent::Connecting {
                server: "pop.a.test".to_string(),
                port: 995,
            },
            SessionEvent::Connected,
            SessionEvent::Authenticated,
            SessionEvent::MessagesFound(2),
            SessionEvent::Deleted(2),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn empty_mailbox_sends_no_dele() {
    let mailbox = Mailbox::with_messages("secret", 0);
    let connector = MockConnector::new().host("pop.a.test", Host::Accept(mailbox.clone()));

    let (summary, _) = run(&connector, &[account("a@a.test", "pop.a.test")]).await;

    assert_eq!(summary.accounts_succeeded, 1);
    assert_eq!(summary.messages_deleted_total, 0);
    assert_eq!(mailbox.received("DELE"), 0);
    assert_eq!(mailbox.received("QUIT"), 1);
}

#[tokio::test(start_paused = true)]
async fn disabled_account_is_never_contacted() {
    let mailbox = Mailbox::with_messages("secret", 3);
    let connector = MockConnector::new().host("pop.a.test", Host::Accept(mailbox.clone()));
    let accounts = [account("a@a.test", "pop.a.test").with_enabled(false)];

    let (summary, reporter) = run(&connector, &accounts).await;

    assert_eq!(connector.connects(), 0);
    assert_eq!(mailbox.message_count(), 3);
    assert_eq!(summary.accounts_skipped, 1);
    assert_eq!(summary.accounts_total, 0);
    assert_eq!(reporter.events_for("a@a.test"), vec![SessionEvent::Skipped]);
}

#[tokio::test(start_paused = true)]
async fn environment_override_wins() {
    let mailbox = Mailbox::with_messages("from-env", 1);
    let connector = MockConnector::new().host("pop.a.test", Host::Accept(mailbox.clone()));
    let credentials = CredentialResolver::with_lookup("MAIL_PASS", |key| {
        (key == "MAIL_PASS_A_A_TEST").then(|| "from-env".to_string())
    });

    let (summary, _) = run_with(
        &connector,
        credentials,
        &[account("a@a.test", "pop.a.test").with_password("stale")],
    )
    .await;

    assert_eq!(summary.accounts_succeeded, 1);
    assert_eq!(mailbox.message_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn missing_credential_never_connects() {
    let connector = MockConnector::new().host(
        "pop.a.test",
        Host::Accept(Mailbox::with_messages("secret", 1)),
    );

    let (summary, reporter) = run(&connector, &[Account::new("a@a.test", "pop.a.test")]).await;

    assert_eq!(connector.connects(), 0);
    assert_eq!(summary.accounts_total, 1);
    assert_eq!(summary.accounts_succeeded, 0);
    assert_eq!(
        failure(&reporter, "a@a.test"),
        Some(FailureKind::MissingCredential)
    );
}

#[tokio::test(start_paused = true)]
async fn one_timeout_does_not_stop_the_run() {
    let first = Mailbox::with_messages("secret", 2);
    let third = Mailbox::with_messages("secret", 3);
    let connector = MockConnector::new()
        .host("pop.a.test", Host::Accept(first.clone()))
        .host("pop.b.test", Host::Hang)
        .host("pop.c.test", Host::Accept(third.clone()));
    let accounts = [
        account("a@a.test", "pop.a.test"),
        account("b@b.test", "pop.b.test"),
        account("c@c.test", "pop.c.test"),
    ];

    let (summary, reporter) = run(&connector, &accounts).await;

    assert_eq!(reporter.started(), vec!["a@a.test", "b@b.test", "c@c.test"]);
    assert_eq!(failure(&reporter, "b@b.test"), Some(FailureKind::Timeout));
    assert_eq!(summary.accounts_total, 3);
    assert_eq!(summary.accounts_succeeded, 2);
    assert_eq!(summary.messages_deleted_total, 5);
    assert_eq!(first.message_count(), 0);
    assert_eq!(third.message_count(), 0);
    assert_eq!(connector.open(), 0);
}

#[tokio::test(start_paused = true)]
async fn refused_connection_is_a_connect_error() {
    let connector = MockConnector::new().host("pop.a.test", Host::Refuse);

    let (summary, reporter) = run(&connector, &[account("a@a.test", "pop.a.test")]).await;

    assert_eq!(summary.accounts_succeeded, 0);
    assert_eq!(
        failure(&reporter, "a@a.test"),
        Some(FailureKind::ConnectError)
    );
    assert_eq!(connector.connects(), 1);
    assert_eq!(connector.open(), 0);
}

#[tokio::test(start_paused = true)]
async fn second_run_finds_nothing() {
    let mailbox = Mailbox::with_messages("secret", 4);
    let connector = MockConnector::new().host("pop.a.test", Host::Accept(mailbox.clone()));
    let accounts = [account("a@a.test", "pop.a.test")];

    let (first, _) = run(&connector, &accounts).await;
    let (second, _) = run(&connector, &accounts).await;

    assert_eq!(first.messages_deleted_total, 4);
    assert_eq!(second.accounts_succeeded, 1);
    assert_eq!(second.messages_deleted_total, 0);
}

#[tokio::test(start_paused = true)]
async fn rejected_password_closes_without_touching_mail() {
    let mailbox = Mailbox::with_messages("secret", 2);
    let connector = MockConnector::new().host("pop.a.test", Host::Accept(mailbox.clone()));

    let (summary, reporter) = run(
        &connector,
        &[account("a@a.test", "pop.a.test").with_password("wrong")],
    )
    .await;

    assert_eq!(failure(&reporter, "a@a.test"), Some(FailureKind::AuthError));
    assert_eq!(summary.messages_deleted_total, 0);
    assert_eq!(mailbox.message_count(), 2);
    assert_eq!(mailbox.received("LIST"), 0);
    assert_eq!(mailbox.received("QUIT"), 1);
    assert_eq!(connector.open(), 0);
}

#[tokio::test(start_paused = true)]
async fn malformed_listing_is_a_protocol_error() {
    let mailbox = Mailbox::with_messages("secret", 2).malformed_list();
    let connector = MockConnector::new().host("pop.a.test", Host::Accept(mailbox.clone()));

    let (summary, reporter) = run(&connector, &[account("a@a.test", "pop.a.test")]).await;

    assert_eq!(
        failure(&reporter, "a@a.test"),
        Some(FailureKind::ProtocolError)
    );
    assert_eq!(summary.accounts_succeeded, 0);
    assert_eq!(mailbox.received("DELE"), 0);
    assert_eq!(mailbox.received("QUIT"), 1);
    assert_eq!(connector.open(), 0);
}

#[tokio::test(start_paused = true)]
async fn rejected_dele_fails_the_account() {
    let mailbox = Mailbox::with_messages("secret", 4).fail_dele_at(3);
    let connector = MockConnector::new().host("pop.a.test", Host::Accept(mailbox.clone()));

    let (summary, reporter) = run(&connector, &[account("a@a.test", "pop.a.test")]).await;

    assert_eq!(
        failure(&reporter, "a@a.test"),
        Some(FailureKind::ProtocolError)
    );
    assert_eq!(summary.accounts_succeeded, 0);
    assert_eq!(summary.messages_deleted_total, 0);
    assert_eq!(mailbox.received("DELE"), 3);
    assert_eq!(mailbox.received("QUIT"), 1);
    assert_eq!(connector.open(), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_commit_keeps_messages() {
    let mailbox = Mailbox::with_messages("secret", 2).fail_quit();
    let connector = MockConnector::new().host("pop.a.test", Host::Accept(mailbox.clone()));

    let (summary, reporter) = run(&connector, &[account("a@a.test", "pop.a.test")]).await;

    assert_eq!(
        failure(&reporter, "a@a.test"),
        Some(FailureKind::ProtocolError)
    );
    assert_eq!(summary.messages_deleted_total, 0);
    assert_eq!(mailbox.message_count(), 2);
    assert_eq!(connector.open(), 0);
}

#[tokio::test(start_paused = true)]
async fn stalls_at_any_step_time_out_and_close() {
    for at in [
        Stall::Greeting,
        Stall::Command("USER"),
        Stall::Command("PASS"),
        Stall::Command("LIST"),
        Stall::Command("DELE"),
        Stall::Command("QUIT"),
    ] {
        let mailbox = Mailbox::with_messages("secret", 2).stall(at);
        let connector = MockConnector::new().host("pop.a.test", Host::Accept(mailbox.clone()));

        let (summary, reporter) = run(&connector, &[account("a@a.test", "pop.a.test")]).await;

        assert_eq!(
            failure(&reporter, "a@a.test"),
            Some(FailureKind::Timeout),
            "stalled at {at:?}"
        );
        assert_eq!(summary.accounts_succeeded, 0, "stalled at {at:?}");
        assert_eq!(mailbox.message_count(), 2, "stalled at {at:?}");
        assert_eq!(connector.open(), 0, "stalled at {at:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn summary_reported_once_for_empty_list() {
    let connector = MockConnector::new();

    let (summary, reporter) = run(&connector, &[]).await;

    assert_eq!(summary.accounts_total, 0);
    assert!(summary.finished_at.is_some());
    assert_eq!(reporter.summaries, vec![summary]);
    assert!(reporter.events.is_empty());
}
