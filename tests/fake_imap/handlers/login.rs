//! LOGIN command handler.
//!
//! Credentials are not checked; the scenario decides whether the
//! login succeeds.

use crate::fake_imap::io::write_line;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

/// Handle the LOGIN command. Returns `false` if the write failed.
pub async fn handle_login<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    accept: bool,
    stream: &mut BufReader<S>,
) -> bool {
    let resp = if accept {
        format!("{tag} OK LOGIN completed\r\n")
    } else {
        format!("{tag} NO [AUTHENTICATIONFAILED] Invalid credentials\r\n")
    };
    write_line(stream, &resp).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    /// Create a `BufReader` over an in-memory duplex stream, run the
    /// handler, and return what was written to the client.
    async fn run(tag: &str, accept: bool) -> (String, bool) {
        let (client, server) = tokio::io::duplex(1024);
        let mut stream = BufReader::new(server);

        let ok = handle_login(tag, accept, &mut stream).await;
        drop(stream);

        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut BufReader::new(client), &mut buf)
            .await
            .unwrap();
        (String::from_utf8(buf).unwrap(), ok)
    }

    #[tokio::test]
    async fn responds_with_ok() {
        let (output, ok) = run("A0001", true).await;
        assert!(ok);
        assert_eq!(output, "A0001 OK LOGIN completed\r\n");
    }

    #[tokio::test]
    async fn responds_with_no_when_rejecting() {
        let (output, ok) = run("A0002", false).await;
        assert!(ok);
        assert!(output.starts_with("A0002 NO "));
        assert!(output.contains("AUTHENTICATIONFAILED"));
    }
}
