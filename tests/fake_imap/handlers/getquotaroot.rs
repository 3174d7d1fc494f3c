//! GETQUOTAROOT command handler (RFC 2087 Section 4.3).
//!
//! A server with the QUOTA extension names the quota roots of the
//! mailbox and then the usage of each root:
//!
//! ```text
//!   Client:  A0002 GETQUOTAROOT INBOX
//!   Server:  * QUOTAROOT INBOX ""
//!   Server:  * QUOTA "" (STORAGE 2048 10240)
//!   Server:  A0002 OK Getquotaroot completed
//! ```
//!
//! Servers without the extension reject the command as unknown; some
//! answer NO with free text instead.

use crate::fake_imap::io::{write_line, write_lines};
use crate::fake_imap::scenario::QuotaReply;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

/// Handle GETQUOTAROOT according to the scenario's reply.
pub async fn handle_getquotaroot<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    mailbox: &str,
    reply: &QuotaReply,
    stream: &mut BufReader<S>,
) {
    let untagged: Vec<String> = match reply {
        QuotaReply::Storage { used, limit } => vec![
            format!("* QUOTAROOT {mailbox} \"\"\r\n"),
            format!("* QUOTA \"\" (STORAGE {used} {limit})\r\n"),
        ],
        QuotaReply::Lines(lines) => lines.iter().map(|l| format!("* {l}\r\n")).collect(),
        QuotaReply::Unsupported => {
            let resp = format!("{tag} BAD Unknown command GETQUOTAROOT\r\n");
            let _ = write_line(stream, &resp).await;
            return;
        }
        QuotaReply::Rejected(text) => {
            let resp = format!("{tag} NO {text}\r\n");
            let _ = write_line(stream, &resp).await;
            return;
        }
    };

    if write_lines(stream, &untagged).await.is_err() {
        return;
    }
    let resp = format!("{tag} OK Getquotaroot completed\r\n");
    let _ = write_line(stream, &resp).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn run(tag: &str, reply: &QuotaReply) -> String {
        let (client, server) = tokio::io::duplex(1024);
        let mut stream = BufReader::new(server);

        handle_getquotaroot(tag, "INBOX", reply, &mut stream).await;
        drop(stream);

        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut BufReader::new(client), &mut buf)
            .await
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn storage_reply() {
        let output = run("A3", &QuotaReply::Storage { used: 1, limit: 2 }).await;
        assert_eq!(
            output,
            "* QUOTAROOT INBOX \"\"\r\n* QUOTA \"\" (STORAGE 1 2)\r\nA3 OK Getquotaroot completed\r\n"
        );
    }

    #[tokio::test]
    async fn raw_lines_reply() {
        let reply = QuotaReply::Lines(vec!["QUOTA \"\" (MESSAGE 4 100)".to_string()]);
        let output = run("A3", &reply).await;
        assert!(output.starts_with("* QUOTA \"\" (MESSAGE 4 100)\r\n"));
        assert!(output.ends_with("A3 OK Getquotaroot completed\r\n"));
    }

    #[tokio::test]
    async fn rejected_reply_keeps_text_verbatim() {
        let output = run("A3", &QuotaReply::Rejected("Quota unsupported {1}".into())).await;
        assert_eq!(output, "A3 NO Quota unsupported {1}\r\n");
    }

    #[tokio::test]
    async fn unsupported_reply() {
        let output = run("A3", &QuotaReply::Unsupported).await;
        assert_eq!(output, "A3 BAD Unknown command GETQUOTAROOT\r\n");
    }
}
