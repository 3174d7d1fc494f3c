#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! CLI for checking IMAP storage quota

use clap::Parser;
use imap_quota::{
    DEFAULT_PORT, Error, ImapConfig, QuotaError, Report, connect, fetch_quota, login, logout,
};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Connection or TLS setup failed.
const EXIT_CONNECT: u8 = 2;
/// The server rejected the credentials.
const EXIT_AUTH: u8 = 3;

#[derive(Parser)]
#[command(name = "imap-quota")]
#[command(about = "IMAP quota checker (optional insecure TLS bypass)")]
struct Args {
    /// IMAP server hostname
    #[arg(long, env = "IMAP_HOST")]
    server: String,

    /// TCP port
    #[arg(long, env = "IMAP_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Login username
    #[arg(long, env = "IMAP_USERNAME")]
    user: String,

    /// Login password
    #[arg(long, env = "IMAP_PASSWORD", hide_env_values = true)]
    password: String,

    /// Disable SSL certificate verification (INSECURE)
    #[arg(long)]
    insecure: bool,

    /// Use STARTTLS (connect plain then upgrade) - typically port 143
    #[arg(long)]
    starttls: bool,

    /// Network timeout in seconds, applied to each step
    #[arg(long, env = "IMAP_TIMEOUT", default_value = "30")]
    timeout: u64,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn config(&self) -> ImapConfig {
        ImapConfig {
            host: self.server.clone(),
            port: self.port,
            username: self.user.clone(),
            password: self.password.clone(),
            insecure: self.insecure,
            starttls: self.starttls,
            timeout: Duration::from_secs(self.timeout),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.config();

    if let Err(e) = config.validate() {
        eprintln!("[ERROR] connection failed: {e}");
        return Ok(ExitCode::from(EXIT_CONNECT));
    }

    let client = match connect(&config).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("[ERROR] connection failed: {e}");
            return Ok(ExitCode::from(EXIT_CONNECT));
        }
    };

    let login_result = tokio::time::timeout(
        config.timeout,
        login(client, &config.username, &config.password),
    )
    .await;

    let mut session = match login_result {
        Ok(Ok(session)) => session,
        Ok(Err((e, mut client))) if e.is_auth() => {
            eprintln!("[ERROR] login failed: {e}");
            tokio::time::timeout(config.timeout, logout(&mut client))
                .await
                .ok();
            return Ok(ExitCode::from(EXIT_AUTH));
        }
        Ok(Err((e, _))) => {
            eprintln!("[ERROR] connection failed: {e}");
            return Ok(ExitCode::from(EXIT_CONNECT));
        }
        Err(_) => {
            let e = Error::Timeout {
                step: "LOGIN",
                after: config.timeout,
            };
            eprintln!("[ERROR] connection failed: {e}");
            return Ok(ExitCode::from(EXIT_CONNECT));
        }
    };

    let outcome = tokio::time::timeout(config.timeout, fetch_quota(&mut session))
        .await
        .unwrap_or_else(|_| {
            Err(QuotaError::Transport(Error::Timeout {
                step: "GETQUOTAROOT",
                after: config.timeout,
            }))
        });
    let report = Report::new(&config, &outcome);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    } else {
        print!("{report}");
    }

    tokio::time::timeout(config.timeout, logout(&mut session))
        .await
        .ok();
    Ok(ExitCode::SUCCESS)
}
