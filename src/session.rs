//! IMAP connection setup
//!
//! Opens a TLS-protected connection (implicit TLS or STARTTLS), checks
//! the greeting, logs in, and logs out. Everything after the greeting
//! goes through `async-imap`.

use crate::channel::first_line;
use crate::config::ImapConfig;
use crate::error::{Error, Result};
use crate::tls::TlsPolicy;
use async_imap::imap_proto::{self, Response};
use async_imap::{Client, Connection, Session};
use futures::io::{AsyncRead, AsyncWrite};
use rustls::pki_types::ServerName;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};
use tracing::{debug, info};

/// The TLS transport under every client and session.
pub type ImapStream = Compat<TlsStream<TcpStream>>;

/// A TLS-protected connection that has not logged in yet.
pub type ImapClient = Client<ImapStream>;

/// A TLS-protected, authenticated IMAP session.
pub type ImapSession = Session<ImapStream>;

/// Open a TLS-protected connection and consume the server greeting.
///
/// With `config.starttls` the greeting is read in plaintext, STARTTLS
/// is issued, and the TLS handshake runs on the same socket. Otherwise
/// the handshake runs right after the TCP connect.
///
/// TCP connect, TLS handshake, and each exchange before LOGIN are
/// bounded by `config.timeout`.
///
/// # Errors
///
/// Returns [`Error::Connect`] if the TCP connection fails or the
/// greeting is not `OK`/`PREAUTH`, [`Error::Tls`] if STARTTLS is
/// refused or the handshake fails, and [`Error::Timeout`] when a step
/// exceeds the configured timeout.
pub async fn connect(config: &ImapConfig) -> Result<ImapClient> {
    let policy = TlsPolicy::from_insecure(config.insecure);
    let connector = policy.connector()?;
    let server_name = ServerName::try_from(config.host.clone())
        .map_err(|e| Error::Tls(format!("Invalid server name: {e}")))?;

    let addr = config.addr();
    debug!("Connecting to IMAP server at {} ({:?})", addr, policy);

    let tcp_stream = bounded("TCP connect", config.timeout, async {
        TcpStream::connect(&addr)
            .await
            .map_err(|e| Error::Connect(format!("{addr}: {e}")))
    })
    .await?;

    let client = if config.starttls {
        let mut client = Client::new(tcp_stream.compat());
        bounded("greeting", config.timeout, read_greeting(&mut client)).await?;

        bounded("STARTTLS", config.timeout, async {
            client
                .run_command_and_check_ok("STARTTLS", None)
                .await
                .map_err(|e| Error::Tls(format!("STARTTLS failed: {e}")))
        })
        .await?;

        let inner = client.into_inner().into_inner();
        let tls_stream = handshake(&connector, server_name, inner, config.timeout).await?;
        Client::new(tls_stream.compat())
    } else {
        let tls_stream = handshake(&connector, server_name, tcp_stream, config.timeout).await?;
        let mut client = Client::new(tls_stream.compat());
        bounded("greeting", config.timeout, read_greeting(&mut client)).await?;
        client
    };

    info!(
        "Connected to IMAP server (starttls={}, verified={})",
        config.starttls,
        policy.verifies_certificates()
    );
    Ok(client)
}

/// Authenticate with LOGIN.
///
/// On failure the client comes back with the error, so the caller can
/// still log out.
///
/// # Errors
///
/// Returns [`Error::Auth`] if the server answers `NO`/`BAD` or the
/// credentials cannot be sent as quoted strings, and [`Error::Imap`]
/// if the exchange itself fails.
pub async fn login(
    client: ImapClient,
    username: &str,
    password: &str,
) -> std::result::Result<ImapSession, (Error, ImapClient)> {
    match client.login(username, password).await {
        Ok(session) => {
            info!("Logged in as {}", username);
            Ok(session)
        }
        Err((e, client)) => Err((login_error(e), client)),
    }
}

/// Send LOGOUT and wait for the server to acknowledge it.
///
/// Works before and after LOGIN; both [`ImapClient`] and
/// [`ImapSession`] dereference to the connection. Callers treat this
/// as best-effort and usually discard the result.
///
/// # Errors
///
/// Returns [`Error::Imap`] if the command cannot be sent or the server
/// does not answer `OK`.
pub async fn logout(conn: &mut Connection<ImapStream>) -> Result<()> {
    conn.run_command_and_check_ok("LOGOUT", None)
        .await
        .map_err(|e| Error::Imap(format!("LOGOUT failed: {e}")))?;
    debug!("Logged out");
    Ok(())
}

fn login_error(e: async_imap::error::Error) -> Error {
    match e {
        async_imap::error::Error::No(msg) | async_imap::error::Error::Bad(msg) => Error::Auth(msg),
        async_imap::error::Error::Validate(e) => {
            Error::Auth(format!("credentials cannot be sent: {e}"))
        }
        other => Error::Imap(format!("Login failed: {other}")),
    }
}

async fn handshake(
    connector: &TlsConnector,
    server_name: ServerName<'static>,
    tcp_stream: TcpStream,
    timeout: Duration,
) -> Result<TlsStream<TcpStream>> {
    bounded("TLS handshake", timeout, async {
        connector
            .connect(server_name, tcp_stream)
            .await
            .map_err(|e| Error::Tls(e.to_string()))
    })
    .await
}

/// Read the untagged greeting. `OK` and `PREAUTH` are acceptable;
/// `BYE` (or anything else) means the server refused us.
async fn read_greeting<T>(conn: &mut Connection<T>) -> Result<()>
where
    T: AsyncRead + AsyncWrite + Unpin + fmt::Debug,
{
    let Some(greeting) = conn.read_response().await? else {
        return Err(Error::Connect("connection closed before greeting".into()));
    };
    let line = first_line(greeting.borrow_owner());
    debug!("S: {}", line);

    match greeting.parsed() {
        Response::Data {
            status: imap_proto::Status::Ok | imap_proto::Status::PreAuth,
            ..
        } => Ok(()),
        _ => Err(Error::Connect(format!("unexpected greeting: {line}"))),
    }
}

async fn bounded<T>(
    step: &'static str,
    after: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| Error::Timeout { step, after })?
}
