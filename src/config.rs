//! IMAP connection configuration

use crate::error::{Error, Result};
use std::time::Duration;

/// Default port for IMAP over implicit TLS.
pub const DEFAULT_PORT: u16 = 993;

/// Default bound on TCP dial and TLS handshake.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection parameters for a single quota check.
#[derive(Debug, Clone)]
pub struct ImapConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Skip certificate and hostname verification.
    pub insecure: bool,
    /// Connect in plaintext and upgrade with STARTTLS.
    pub starttls: bool,
    pub timeout: Duration,
}

impl ImapConfig {
    /// Configuration for `host` with the defaults for everything
    /// except credentials.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: username.into(),
            password: password.into(),
            insecure: false,
            starttls: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// `host:port` as passed to the resolver.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Reject parameters that cannot possibly lead to a connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty host, port 0, or a zero
    /// timeout.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("server must not be empty".into()));
        }
        if self.port == 0 {
            return Err(Error::Config("port must not be 0".into()));
        }
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be at least 1 second".into()));
        }
        Ok(())
    }
}
