//! POP3 connection management with type-state pattern.
//!
//! - Configuration (host, port, timeouts)
//! - TLS stream and connect helper
//! - Framed, timeout-bounded line I/O
//! - Type-state client: `Authorization` → `Transaction`

mod client;
mod config;
mod framed;
mod stream;

pub use client::{Authorization, Client, Transaction};
pub use config::{Config, ConfigBuilder, DEFAULT_PORT, DEFAULT_TIMEOUT};
pub use framed::FramedStream;
pub use stream::{Pop3Stream, connect_tls, create_tls_connector};
