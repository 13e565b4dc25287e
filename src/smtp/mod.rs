//! Partial SMTP dialogue used to probe a recipient without sending mail.
//!
//! [`probe_host`] connects to a mail exchanger and walks the
//! greeting → `EHLO` → `MAIL FROM` → `RCPT TO` → `QUIT` sequence, stopping
//! at the first unexpected reply.

mod engine;
mod reply;
mod session;

pub use engine::{HandshakeParams, Stage, probe_host};
pub use reply::SmtpReply;
