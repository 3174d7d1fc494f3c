//! Error types for imap-quota

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IMAP error: {0}")]
    Imap(String),

    #[error("Connection error: {0}")]
    Connect(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("{step} timed out after {}s", .after.as_secs())]
    Timeout { step: &'static str, after: Duration },
}

impl Error {
    /// Whether the server rejected the credentials, as opposed to the
    /// connection failing underneath the LOGIN exchange.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
