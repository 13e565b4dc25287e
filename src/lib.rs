#![forbid(unsafe_code)]
//! Checks whether an e-mail address is plausibly deliverable without
//! sending mail. An address goes through format validation, an MX lookup
//! and a partial SMTP dialogue against the preferred mail exchanger.

pub mod mx;
pub mod outcome;
pub mod smtp;
pub mod validator;

mod error;
mod options;
mod verify;

pub use error::VerifyError;
pub use mx::{Error as MxError, LookupFailure, MxRecord, build_resolver, select_preferred};
pub use options::VerifyOptions;
pub use outcome::{InfoCode, UnknownInfoCode, VerificationResult, is_ban_notice};
pub use smtp::{HandshakeParams, SmtpReply, Stage, probe_host};
pub use validator::{ValidationReport, domain_of, is_valid_structure, validate_email};
pub use verify::{verify, verify_all};
