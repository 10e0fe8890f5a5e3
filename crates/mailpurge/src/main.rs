//! `mailpurge` - empties POP3 mailboxes.
//!
//! Reads an account file, then for every enabled account logs in over
//! implicit TLS, marks every message for deletion and commits with `QUIT`.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use mailpurge_core::{
    Account, AccountRepository, Cleanup, CleanupConfig, CredentialResolver, TlsConnector,
    TracingReporter,
};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_path().as_deref())?;

    let path = cli.accounts_path();
    let accounts = AccountRepository::new(&path)
        .load()
        .with_context(|| format!("failed to load accounts from {}", path.display()))?;

    match cli.subcommand() {
        Command::Run => run(&cli, &accounts).await,
        Command::List => {
            list(&cli, &accounts);
            Ok(())
        }
    }
}

async fn run(cli: &Cli, accounts: &[Account]) -> Result<()> {
    if accounts.is_empty() {
        warn!("No accounts configured");
        return Ok(());
    }

    info!("Starting mailpurge");

    let config = CleanupConfig::default()
        .timeout(cli.timeout())
        .namespace(cli.namespace.clone());
    let connector = TlsConnector::new(config.timeout);
    let mut cleanup = Cleanup::new(config, connector, TracingReporter);
    cleanup.run(accounts).await;

    Ok(())
}

fn list(cli: &Cli, accounts: &[Account]) {
    if accounts.is_empty() {
        warn!("No accounts configured");
        return;
    }

    let credentials = CredentialResolver::from_env(cli.namespace.clone());

    println!(
        "{:>3}  {:<32} {:<32} {:<8} {:<4} DESCRIPTION",
        "#", "EMAIL", "SERVER", "STATUS", "ENV"
    );
    for (position, account) in accounts.iter().enumerate() {
        let server = format!("{}:{}", account.server, account.port);
        let status = if account.enabled { "enabled" } else { "disabled" };
        let env = if credentials.has_override(account) { "yes" } else { "no" };
        println!(
            "{:>3}  {:<32} {:<32} {:<8} {:<4} {}",
            position + 1,
            account.email,
            server,
            status,
            env,
            account.description.as_deref().unwrap_or("")
        );
    }
}
