//! Storage quota lookup (RFC 2087 GETQUOTAROOT)
//!
//! Only the `STORAGE` resource is reported; other resources such as
//! `MESSAGE` are ignored. Servers without the QUOTA extension are a
//! normal outcome and come back as [`QuotaError::Unsupported`].

use crate::channel::ImapChannel;
use crate::error::Error;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Mailbox whose quota root is queried.
pub const QUOTA_MAILBOX: &str = "INBOX";

static STORAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"STORAGE\s+(\d+)\s+(\d+)").expect("STORAGE pattern is valid")
});

/// Storage usage as reported by the server, in kilobytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaUsage {
    pub used_kb: u64,
    pub limit_kb: u64,
}

impl QuotaUsage {
    #[must_use]
    pub const fn new(used_kb: u64, limit_kb: u64) -> Self {
        Self { used_kb, limit_kb }
    }

    /// Percentage of the limit in use; 0 when there is no limit.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn percent_used(&self) -> f64 {
        if self.limit_kb == 0 {
            return 0.0;
        }
        self.used_kb as f64 * 100.0 / self.limit_kb as f64
    }

    #[must_use]
    pub const fn used_mb(&self) -> f64 {
        kb_to_mb(self.used_kb)
    }

    #[must_use]
    pub const fn limit_mb(&self) -> f64 {
        kb_to_mb(self.limit_kb)
    }
}

/// Why no [`QuotaUsage`] could be produced. None of these are fatal.
#[derive(thiserror::Error, Debug)]
pub enum QuotaError {
    #[error("Server didn't accept GETQUOTAROOT (no QUOTA support)")]
    Unsupported,

    #[error("No QUOTA response")]
    Missing,

    #[error("Failed parse QUOTA: {0}")]
    Unparseable(String),

    #[error(transparent)]
    Transport(#[from] Error),
}

#[allow(clippy::cast_precision_loss)]
const fn kb_to_mb(kb: u64) -> f64 {
    kb as f64 / 1024.0
}

/// `"<kb / 1024> MB"` with two decimals.
#[must_use]
pub fn human_mb(kb: u64) -> String {
    format!("{:.2} MB", kb_to_mb(kb))
}

/// Extract `STORAGE <used> <limit>` from the joined QUOTA payloads.
///
/// Whitespace between the tokens may be anything `\s` matches, and
/// surrounding text (other resources, mailbox names) is ignored.
///
/// # Errors
///
/// Returns [`QuotaError::Unparseable`] with the raw text if there is no
/// STORAGE pair or a number does not fit in a `u64`.
pub fn parse_storage(text: &str) -> Result<QuotaUsage, QuotaError> {
    let caps = STORAGE
        .captures(text)
        .ok_or_else(|| QuotaError::Unparseable(text.to_string()))?;

    let number = |i: usize| -> Result<u64, QuotaError> {
        caps[i]
            .parse()
            .map_err(|_| QuotaError::Unparseable(text.to_string()))
    };

    Ok(QuotaUsage::new(number(1)?, number(2)?))
}

/// Issue `GETQUOTAROOT INBOX` and read the STORAGE usage.
///
/// # Errors
///
/// Every failure is a [`QuotaError`]: a rejected command means the
/// server lacks the QUOTA extension, a missing or unparseable `QUOTA`
/// line is reported with its raw text, and transport failures are
/// wrapped as [`QuotaError::Transport`].
pub async fn fetch_quota<C: ImapChannel>(channel: &mut C) -> Result<QuotaUsage, QuotaError> {
    let completion = channel
        .execute(&format!("GETQUOTAROOT {QUOTA_MAILBOX}"))
        .await?;

    if !completion.is_ok() {
        warn!(
            "GETQUOTAROOT rejected: {} {}",
            completion.status, completion.text
        );
        return Err(QuotaError::Unsupported);
    }

    let payloads: Vec<&str> = completion.untagged("QUOTA").collect();
    if payloads.is_empty() {
        return Err(QuotaError::Missing);
    }

    let joined = payloads.join(" ");
    debug!("QUOTA payload: {}", joined);
    parse_storage(&joined)
}
