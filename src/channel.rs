//! Tagged command/response channel
//!
//! IMAP pairs every client command with a tag. The server answers with
//! any number of untagged `*` lines followed by one tagged completion
//! (`OK`, `NO` or `BAD`):
//!
//! ```text
//!   C: A0002 GETQUOTAROOT INBOX
//!   S: * QUOTAROOT INBOX ""
//!   S: * QUOTA "" (STORAGE 2048 10240)
//!   S: A0002 OK Getquotaroot completed
//! ```
//!
//! [`ImapChannel`] is the contract the rest of the crate talks to:
//! send a command, read until its completion, then query the untagged
//! lines by keyword. It is implemented for [`async_imap::Session`], so
//! framing, literals and tagging stay with `async-imap`; only the raw
//! text of each untagged response is kept for the caller.

use crate::error::{Error, Result};
use async_imap::Session;
use async_imap::imap_proto::{self, Response};
use futures::io::{AsyncRead, AsyncWrite};
use std::{fmt, io};
use tracing::debug;

/// Result of a tagged completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    No,
    Bad,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::No => "NO",
            Self::Bad => "BAD",
        }
    }

    /// `PREAUTH` and `BYE` never complete a command; treat them as `BAD`.
    const fn from_wire(status: &imap_proto::Status) -> Self {
        match status {
            imap_proto::Status::Ok => Self::Ok,
            imap_proto::Status::No => Self::No,
            _ => Self::Bad,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the server said in answer to one command.
#[derive(Debug, Clone)]
pub struct Completion {
    pub tag: String,
    pub status: Status,
    /// Human-readable text after the status word.
    pub text: String,
    /// Untagged lines received before the completion, `* ` stripped.
    pub untagged: Vec<String>,
}

impl Completion {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Payloads of the untagged lines whose first token is `keyword`
    /// (ASCII case-insensitive), with the keyword itself removed.
    ///
    /// `QUOTAROOT` lines do not match `QUOTA`: the whole token must be
    /// equal.
    pub fn untagged<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.untagged.iter().filter_map(move |line| {
            let (head, rest) = line.split_once(' ').unwrap_or((line.as_str(), ""));
            head.eq_ignore_ascii_case(keyword).then(|| rest.trim())
        })
    }
}

/// Minimal raw command interface to an IMAP server.
#[allow(async_fn_in_trait)]
pub trait ImapChannel {
    /// Send `command` (without tag or CRLF) and return the tag used.
    async fn send_command(&mut self, command: &str) -> Result<String>;

    /// Read responses until the completion tagged `tag`.
    async fn read_completion(&mut self, tag: &str) -> Result<Completion>;

    /// Send a command and wait for its completion.
    async fn execute(&mut self, command: &str) -> Result<Completion> {
        let tag = self.send_command(command).await?;
        self.read_completion(&tag).await
    }
}

impl<T> ImapChannel for Session<T>
where
    T: AsyncRead + AsyncWrite + Unpin + fmt::Debug + Send,
{
    async fn send_command(&mut self, command: &str) -> Result<String> {
        let id = self
            .run_command(command)
            .await
            .map_err(|e| Error::Imap(format!("Failed to send {command}: {e}")))?;
        debug!("C: {} {}", id.0, command);
        Ok(id.0)
    }

    async fn read_completion(&mut self, tag: &str) -> Result<Completion> {
        let mut untagged = Vec::new();

        loop {
            let Some(response) = self.read_response().await? else {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed by server",
                )));
            };
            let line = first_line(response.borrow_owner());
            debug!("S: {}", line);

            match response.parsed() {
                Response::Done {
                    tag: id,
                    status,
                    information,
                    ..
                } => {
                    if id.0 != tag {
                        debug!("Ignoring response for tag {}", id.0);
                        continue;
                    }
                    return Ok(Completion {
                        tag: id.0.clone(),
                        status: Status::from_wire(status),
                        text: information.as_deref().unwrap_or_default().to_string(),
                        untagged,
                    });
                }
                Response::Continue { .. } => {
                    return Err(Error::Imap(format!(
                        "unexpected continuation request: {line}"
                    )));
                }
                _ => {
                    let payload = line.strip_prefix("* ").unwrap_or(&line);
                    untagged.push(payload.to_string());
                }
            }
        }
    }
}

/// First line of a response as the server sent it, without CRLF.
///
/// `raw` is the buffer a parsed response borrows from, which starts
/// where the response starts. A literal inside the response ends the
/// line early.
pub(crate) fn first_line(raw: &[u8]) -> String {
    let end = raw
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
