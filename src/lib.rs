//! IMAP quota checker
//!
//! Connects to an IMAP server over implicit TLS or STARTTLS, logs in,
//! asks for the quota of `INBOX` with `GETQUOTAROOT` (RFC 2087), and
//! reports the `STORAGE` usage in kilobytes and megabytes.
//!
//! ```no_run
//! use imap_quota::{ImapConfig, Report, connect, fetch_quota, login, logout};
//!
//! # async fn run() -> imap_quota::Result<()> {
//! let config = ImapConfig::new("mail.example.org", "me@example.org", "secret");
//! let client = connect(&config).await?;
//! let mut session = login(client, &config.username, &config.password)
//!     .await
//!     .map_err(|(e, _)| e)?;
//!
//! let outcome = fetch_quota(&mut session).await;
//! print!("{}", Report::new(&config, &outcome));
//!
//! logout(&mut session).await.ok();
//! # Ok(())
//! # }
//! ```

#![allow(clippy::future_not_send)]

mod channel;
mod config;
mod error;
mod quota;
mod report;
mod session;
mod tls;

pub use channel::{Completion, ImapChannel, Status};
pub use config::{DEFAULT_PORT, DEFAULT_TIMEOUT, ImapConfig};
pub use error::{Error, Result};
pub use quota::{QUOTA_MAILBOX, QuotaError, QuotaUsage, fetch_quota, human_mb, parse_storage};
pub use report::{JsonReport, JsonUsage, Report};
pub use session::{ImapClient, ImapSession, ImapStream, connect, login, logout};
pub use tls::TlsPolicy;
