//! Rendering of a quota check for the terminal or as JSON

use crate::config::ImapConfig;
use crate::quota::{QuotaError, QuotaUsage, human_mb};
use serde::Serialize;
use std::fmt;

const INSECURE_WARNING: &str = "⚠️  Warning: SSL verification DISABLED (insecure)";
const INSECURE_NOTE: &str = "⚠️  Note: running with --insecure; consider enabling certificate verification after fixing server certs.";

/// Outcome of one quota check together with the parameters used.
pub struct Report<'a> {
    config: &'a ImapConfig,
    outcome: &'a Result<QuotaUsage, QuotaError>,
}

impl<'a> Report<'a> {
    #[must_use]
    pub const fn new(config: &'a ImapConfig, outcome: &'a Result<QuotaUsage, QuotaError>) -> Self {
        Self { config, outcome }
    }

    /// Whether the report carries numbers (as opposed to a warning).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The report as printed to stdout, one entry per line.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        match self.outcome {
            Ok(usage) => {
                lines.push(format!(
                    "Server     : {}:{} (starttls={})",
                    self.config.host, self.config.port, self.config.starttls
                ));
                lines.push(format!("User       : {}", self.config.username));
                lines.push(format!(
                    "Used       : {} KB  ({})",
                    usage.used_kb,
                    human_mb(usage.used_kb)
                ));
                lines.push(format!(
                    "Limit      : {} KB  ({})",
                    usage.limit_kb,
                    human_mb(usage.limit_kb)
                ));
                lines.push(format!("Percent    : {:.1}%", usage.percent_used()));
                if self.config.insecure {
                    lines.push(INSECURE_WARNING.to_string());
                }
            }
            Err(e) => {
                lines.push(format!("[WARN] Could not retrieve quota: {e}"));
                if self.config.insecure {
                    lines.push(INSECURE_NOTE.to_string());
                }
            }
        }

        lines
    }

    /// Machine-readable form for `--json`.
    #[must_use]
    pub fn to_json(&self) -> JsonReport<'a> {
        let (usage, error) = match self.outcome {
            Ok(usage) => (
                Some(JsonUsage {
                    used_kb: usage.used_kb,
                    limit_kb: usage.limit_kb,
                    used_mb: round2(usage.used_mb()),
                    limit_mb: round2(usage.limit_mb()),
                    percent_used: round1(usage.percent_used()),
                }),
                None,
            ),
            Err(e) => (None, Some(e.to_string())),
        };

        JsonReport {
            server: &self.config.host,
            port: self.config.port,
            starttls: self.config.starttls,
            user: &self.config.username,
            insecure: self.config.insecure,
            usage,
            error,
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub server: &'a str,
    pub port: u16,
    pub starttls: bool,
    pub user: &'a str,
    pub insecure: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub usage: Option<JsonUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonUsage {
    pub used_kb: u64,
    pub limit_kb: u64,
    pub used_mb: f64,
    pub limit_mb: f64,
    pub percent_used: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
