use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, error, info};

use super::reply::SmtpReply;
use super::session::SmtpSession;
use crate::outcome::{self, VerificationResult};

/// Position in the probe dialogue. Only moves forward, one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Greeting,
    Ehlo,
    MailFrom,
    RcptTo,
    Quit,
}

impl Stage {
    pub fn index(self) -> u8 {
        match self {
            Self::Greeting => 0,
            Self::Ehlo => 1,
            Self::MailFrom => 2,
            Self::RcptTo => 3,
            Self::Quit => 4,
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Greeting => Self::Ehlo,
            Self::Ehlo => Self::MailFrom,
            Self::MailFrom => Self::RcptTo,
            Self::RcptTo | Self::Quit => Self::Quit,
        }
    }
}

/// Everything the dialogue needs besides the stream.
#[derive(Debug, Clone)]
pub struct HandshakeParams<'a> {
    pub email: &'a str,
    pub sender: &'a str,
    pub fqdn: &'a str,
    pub ignore: Option<&'a str>,
}

/// What the driver does after a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    /// Send the command and move to the next stage.
    Advance(String),
    /// Close without further commands.
    Abort(VerificationResult),
    /// Keep the result, send `QUIT`, move to [`Stage::Quit`].
    Conclude(VerificationResult),
    /// Dialogue over.
    Close,
}

/// Transition for `reply` received in `stage`. Pure: same inputs, same step.
pub(crate) fn step(stage: Stage, reply: &SmtpReply, params: &HandshakeParams<'_>) -> Step {
    match stage {
        Stage::Greeting if reply.code == Some(220) => {
            Step::Advance(format!("EHLO {}", params.fqdn))
        }
        Stage::Ehlo if reply.code == Some(250) => {
            Step::Advance(format!("MAIL FROM:<{}>", params.sender))
        }
        Stage::MailFrom if reply.code == Some(250) => {
            Step::Advance(format!("RCPT TO:<{}>", params.email))
        }
        Stage::Greeting | Stage::Ehlo => Step::Abort(outcome::unavailable(params.email, reply)),
        Stage::MailFrom => Step::Abort(outcome::mail_from_rejected(params.email, reply)),
        Stage::RcptTo => Step::Conclude(outcome::from_rcpt_reply(
            params.email,
            reply,
            params.ignore,
        )),
        Stage::Quit => Step::Close,
    }
}

/// Runs the whole dialogue on an established stream.
///
/// The stream is owned here and released when this returns or when the
/// future is dropped.
pub(crate) async fn run_handshake<S>(stream: S, params: &HandshakeParams<'_>) -> VerificationResult
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut session = SmtpSession::new(stream);
    let mut stage = Stage::Greeting;
    let mut concluded: Option<VerificationResult> = None;

    loop {
        let reply = match session.read_reply().await {
            Ok(reply) => reply,
            Err(err) => {
                if let Some(result) = concluded {
                    debug!("ignoring error after RCPT TO: {err}");
                    return result;
                }
                return session_failure(params.email, stage, &err);
            }
        };

        match step(stage, &reply, params) {
            Step::Advance(command) => {
                if let Err(err) = session.send_command(&command).await {
                    return session_failure(params.email, stage, &err);
                }
                stage = stage.next();
            }
            Step::Abort(result) => {
                debug!(stage = stage.index(), "aborting handshake");
                session.close().await;
                return result;
            }
            Step::Conclude(result) => {
                if let Err(err) = session.send_command("QUIT").await {
                    debug!("QUIT not sent: {err}");
                    return result;
                }
                concluded = Some(result);
                stage = stage.next();
            }
            Step::Close => {
                session.close().await;
                break;
            }
        }
    }

    concluded.unwrap_or_else(|| outcome::closed_by_peer(params.email))
}

fn session_failure(email: &str, stage: Stage, err: &io::Error) -> VerificationResult {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        info!(stage = stage.index(), "connection closed by remote host");
        outcome::closed_by_peer(email)
    } else {
        error!("Socket error: {err}");
        outcome::connection_error(email, err)
    }
}

/// Applies the probe-wide timer to `probe`. `None` disables it.
pub(crate) async fn with_deadline<F>(
    email: &str,
    timeout: Option<Duration>,
    probe: F,
) -> VerificationResult
where
    F: Future<Output = VerificationResult>,
{
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, probe).await {
            Ok(result) => result,
            Err(_) => {
                info!("probe of {email} timed out after {} ms", limit.as_millis());
                outcome::timed_out(email)
            }
        },
        None => probe.await,
    }
}

/// Connects to `host:port` and runs the dialogue, all under one timer.
pub async fn probe_host(
    host: &str,
    port: u16,
    params: &HandshakeParams<'_>,
    timeout: Option<Duration>,
) -> VerificationResult {
    let probe = async {
        info!("Creating connection to {host}:{port}");
        let stream = match TcpStream::connect((host, port)).await {
            Ok(stream) => stream,
            Err(err) => {
                error!("Socket error: {err}");
                return outcome::connection_error(params.email, &err);
            }
        };
        debug!("Connected");
        run_handshake(stream, params).await
    };
    with_deadline(params.email, timeout, probe).await
}
