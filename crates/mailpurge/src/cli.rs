//! Command-line interface.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mailpurge", version)]
#[command(about = "Delete every message from the POP3 mailboxes in an account file", long_about = None)]
pub struct Cli {
    /// Account file (JSON)
    #[arg(long, env = "MAILPURGE_ACCOUNTS", global = true)]
    pub accounts: Option<PathBuf>,

    /// Seconds allowed for connecting and for each read or write
    #[arg(
        long,
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub timeout: u64,

    /// Prefix of the credential override variables
    #[arg(long, default_value = mailpurge_core::credentials::DEFAULT_NAMESPACE, global = true)]
    pub namespace: String,

    /// Log file path
    #[arg(long, global = true, conflicts_with = "no_log_file")]
    pub log_file: Option<PathBuf>,

    /// Log to the console only
    #[arg(long, global = true)]
    pub no_log_file: bool,

    #[command(subcommand)]
    pub cmd: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Purge every enabled account (default)
    Run,
    /// Show configured accounts
    List,
}

impl Cli {
    pub fn subcommand(&self) -> Command {
        self.cmd.unwrap_or(Command::Run)
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Account file, falling back to `<config_dir>/mailpurge/accounts.json`.
    pub fn accounts_path(&self) -> PathBuf {
        self.accounts.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("mailpurge")
                .join("accounts.json")
        })
    }

    /// Log file, unless disabled. Defaults to
    /// `<data_local_dir>/mailpurge/mailpurge.log`.
    pub fn log_path(&self) -> Option<PathBuf> {
        if self.no_log_file {
            return None;
        }
        self.log_file.clone().or_else(|| {
            dirs::data_local_dir().map(|dir| dir.join("mailpurge").join("mailpurge.log"))
        })
    }
}
