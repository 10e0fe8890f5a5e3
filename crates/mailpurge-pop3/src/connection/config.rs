//! Connection configuration types.

use std::time::Duration;

/// Default POP3-over-TLS port.
pub const DEFAULT_PORT: u16 = 995;

/// Default bound for connecting and for every read/write.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// POP3 connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Bound on TCP connect plus TLS handshake.
    pub connect_timeout: Duration,
    /// Bound on each read and write once connected.
    pub io_timeout: Duration,
}

impl Config {
    /// Creates a new configuration for implicit TLS on port 995.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_TIMEOUT,
            io_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(host)
    }
}

/// Builder for connection configuration.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    host: String,
    port: u16,
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl ConfigBuilder {
    /// Creates a new builder with the given hostname.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_TIMEOUT,
            io_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets both the connect and the I/O timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self.io_timeout = timeout;
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the I/O timeout.
    #[must_use]
    pub const fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        Config {
            host: self.host,
            port: self.port,
            connect_timeout: self.connect_timeout,
            io_timeout: self.io_timeout,
        }
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

    #[test]
    fn test_config_new() {
        let config = Config::new("pop.example.com");
        assert_eq!(config.host, "pop.example.com");
        assert_eq!(config.port, 995);
        assert_eq!(config.connect_timeout, Duration::from_secs(60));
        assert_eq!(config.io_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_builder_timeout_sets_both() {
        let config = Config::builder("pop.example.com")
            .port(1995)
            .timeout(Duration::from_secs(5))
            .build();
        assert_eq!(config.port, 1995);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.io_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_builder_individual_timeouts() {
        let config = Config::builder("pop.example.com")
            .connect_timeout(Duration::from_secs(10))
            .io_timeout(Duration::from_secs(30))
            .build();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.io_timeout, Duration::from_secs(30));
    }
}
