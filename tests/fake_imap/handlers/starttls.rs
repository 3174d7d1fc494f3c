//! STARTTLS command handler (RFC 3501 Section 6.2.1).
//!
//! Only the tagged reply is written here; the caller performs the TLS
//! handshake on the raw socket once the client has seen the OK.

use crate::fake_imap::io::write_line;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

/// Handle STARTTLS. Returns `true` if the client should now start the
/// TLS handshake.
pub async fn handle_starttls<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    refuse: bool,
    stream: &mut BufReader<S>,
) -> bool {
    let resp = if refuse {
        format!("{tag} NO STARTTLS not available\r\n")
    } else {
        format!("{tag} OK Begin TLS negotiation now\r\n")
    };
    write_line(stream, &resp).await.is_ok() && !refuse
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn run(tag: &str, refuse: bool) -> (String, bool) {
        let (client, server) = tokio::io::duplex(1024);
        let mut stream = BufReader::new(server);

        let upgrade = handle_starttls(tag, refuse, &mut stream).await;
        drop(stream);

        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut BufReader::new(client), &mut buf)
            .await
            .unwrap();
        (String::from_utf8(buf).unwrap(), upgrade)
    }

    #[tokio::test]
    async fn accepts_upgrade() {
        let (output, upgrade) = run("A0001", false).await;
        assert!(upgrade);
        assert_eq!(output, "A0001 OK Begin TLS negotiation now\r\n");
    }

    #[tokio::test]
    async fn refuses_upgrade() {
        let (output, upgrade) = run("A0001", true).await;
        assert!(!upgrade);
        assert!(output.starts_with("A0001 NO "));
    }
}
