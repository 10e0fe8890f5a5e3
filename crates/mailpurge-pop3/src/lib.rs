//! # mailpurge-pop3
//!
//! An async POP3 client (RFC 1939) for implicit-TLS servers.
//!
//! ## Features
//!
//! - **Type-state connection management**: `USER`/`PASS` only compile in the
//!   authorization state, `LIST`/`DELE` only in the transaction state
//! - **Bounded I/O**: connect, handshake and every read/write are covered by
//!   a timeout
//! - **TLS**: rustls with the webpki root store
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailpurge_pop3::{Client, Config, connect_tls};
//!
//! #[tokio::main]
//! async fn main() -> mailpurge_pop3::Result<()> {
//!     let config = Config::new("pop.example.com");
//!     let stream = connect_tls(&config).await?;
//!     let client = Client::from_stream(stream, config.io_timeout).await?;
//!
//!     let mut client = client
//!         .login("user@example.com", "password")
//!         .await
//!         .map_err(|(err, _client)| err)?;
//!
//!     for entry in client.list().await? {
//!         client.dele(entry.index).await?;
//!     }
//!
//!     // QUIT commits the deletions
//!     client.quit().await
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! ┌───────────────┐
//! │ Authorization │ ─── login() ───→ Transaction ─── quit() ───→ (update, closed)
//! └───────────────┘
//!        │
//!        └─── quit() ───→ (closed)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use connection::{
    Authorization, Client, Config, ConfigBuilder, Pop3Stream, Transaction, connect_tls,
};
pub use error::{Error, Result};
pub use types::{ListEntry, MailboxStat, Reply, Status};
