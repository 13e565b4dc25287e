use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

use super::reply::{ReplyBuilder, SmtpReply};

/// Upper bound for a single reply; servers sending more are not speaking SMTP.
const MAX_REPLY_BYTES: usize = 64 * 1024;

/// Line-oriented SMTP client transport over any byte stream.
pub(crate) struct SmtpSession<S> {
    stream: BufReader<S>,
}

impl<S> SmtpSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    pub(crate) async fn send_command(&mut self, command: &str) -> io::Result<()> {
        debug!("Client: {command}");
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        let stream = self.stream.get_mut();
        stream.write_all(&line).await?;
        stream.flush().await
    }

    /// Reads one complete reply. EOF before the reply completes is reported
    /// as `UnexpectedEof`.
    pub(crate) async fn read_reply(&mut self) -> io::Result<SmtpReply> {
        let mut builder = ReplyBuilder::default();
        let mut received = 0usize;
        let mut raw = Vec::new();
        loop {
            raw.clear();
            // one byte past the cap is enough to tell an oversized reply
            let budget = (MAX_REPLY_BYTES - received + 1) as u64;
            let read = (&mut self.stream)
                .take(budget)
                .read_until(b'\n', &mut raw)
                .await?;
            if read == 0 {
                let message = if builder.is_empty() {
                    "connection closed by remote host"
                } else {
                    "connection closed in the middle of a reply"
                };
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, message));
            }
            received += read;
            if received > MAX_REPLY_BYTES {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("SMTP reply exceeds {MAX_REPLY_BYTES} bytes"),
                ));
            }

            if raw.ends_with(b"\n") {
                raw.pop();
                if raw.ends_with(b"\r") {
                    raw.pop();
                }
            }
            let line = String::from_utf8_lossy(&raw);
            if builder.push(&line) {
                let reply = builder.finish();
                debug!("Server: {}", reply.raw);
                return Ok(reply);
            }
        }
    }

    /// Half-closes the connection. Errors are irrelevant at this point.
    pub(crate) async fn close(&mut self) {
        if let Err(err) = self.stream.get_mut().shutdown().await {
            debug!("shutdown failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, duplex};

    #[tokio::test]
    async fn reads_multiline_reply_in_one_call() {
        let (client, mut server) = duplex(1024);
        server
            .write_all(b"250-first\r\n250-second\r\n250 last\r\n")
            .await
            .unwrap();
        let mut session = SmtpSession::new(client);
        let reply = session.read_reply().await.unwrap();
        assert_eq!(reply.code, Some(250));
        assert_eq!(reply.lines.len(), 3);
    }

    #[tokio::test]
    async fn reply_split_across_writes() {
        let (client, mut server) = duplex(1024);
        let mut session = SmtpSession::new(client);
        let writer = tokio::spawn(async move {
            server.write_all(b"220 mx.exa").await.unwrap();
            tokio::task::yield_now().await;
            server.write_all(b"mple.com ready\r\n").await.unwrap();
            server
        });
        let reply = session.read_reply().await.unwrap();
        assert_eq!(reply.raw, "220 mx.example.com ready");
        drop(writer.await.unwrap());
    }

    #[tokio::test]
    async fn eof_is_unexpected() {
        let (client, server) = duplex(64);
        drop(server);
        let mut session = SmtpSession::new(client);
        let err = session.read_reply().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn commands_are_crlf_terminated() {
        let (client, mut server) = duplex(64);
        let mut session = SmtpSession::new(client);
        session.send_command("EHLO mail.example.org").await.unwrap();
        session.close().await;
        let mut received = String::new();
        server.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "EHLO mail.example.org\r\n");
    }

    #[tokio::test]
    async fn endless_line_hits_the_size_cap() {
        let (client, mut server) = duplex(8 * 1024);
        let writer = tokio::spawn(async move {
            let chunk = [b'x'; 8 * 1024];
            // more than the cap, no newline, connection left open
            for _ in 0..32 {
                if server.write_all(&chunk).await.is_err() {
                    break;
                }
            }
            std::future::pending::<()>().await;
        });
        let mut session = SmtpSession::new(client);
        let err = tokio::time::timeout(std::time::Duration::from_secs(5), session.read_reply())
            .await
            .expect("read_reply must not hang")
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        writer.abort();
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced() {
        let (client, mut server) = duplex(64);
        server.write_all(b"220 caf\xe9\r\n").await.unwrap();
        let mut session = SmtpSession::new(client);
        let reply = session.read_reply().await.unwrap();
        assert_eq!(reply.code, Some(220));
        assert!(reply.raw.starts_with("220 caf"));
    }
}
