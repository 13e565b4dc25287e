//! Result taxonomy and the mapping from DNS, socket and SMTP signals onto it.

use std::fmt;
use std::io;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::mx::LookupFailure;
use crate::smtp::SmtpReply;

/// Closed classification of a verification attempt.
///
/// Serialized as its stable number (see [`InfoCode::as_u8`]).
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(into = "u8", try_from = "u8"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoCode {
    FinishedVerification,
    InvalidEmailStructure,
    NoMxRecords,
    SmtpConnectionTimeout,
    DomainNotFound,
    SmtpConnectionError,
    BannedByServer,
    SmtpUnavailable,
    UnknownError,
}

impl InfoCode {
    pub const ALL: [InfoCode; 9] = [
        Self::FinishedVerification,
        Self::InvalidEmailStructure,
        Self::NoMxRecords,
        Self::SmtpConnectionTimeout,
        Self::DomainNotFound,
        Self::SmtpConnectionError,
        Self::BannedByServer,
        Self::SmtpUnavailable,
        Self::UnknownError,
    ];

    /// Stable numeric value, 1 through 9.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::FinishedVerification => 1,
            Self::InvalidEmailStructure => 2,
            Self::NoMxRecords => 3,
            Self::SmtpConnectionTimeout => 4,
            Self::DomainNotFound => 5,
            Self::SmtpConnectionError => 6,
            Self::BannedByServer => 7,
            Self::SmtpUnavailable => 8,
            Self::UnknownError => 9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FinishedVerification => "FINISHED_VERIFICATION",
            Self::InvalidEmailStructure => "INVALID_EMAIL_STRUCTURE",
            Self::NoMxRecords => "NO_MX_RECORDS",
            Self::SmtpConnectionTimeout => "SMTP_CONNECTION_TIMEOUT",
            Self::DomainNotFound => "DOMAIN_NOT_FOUND",
            Self::SmtpConnectionError => "SMTP_CONNECTION_ERROR",
            Self::BannedByServer => "BANNED_BY_SERVER",
            Self::SmtpUnavailable => "SMTP_UNAVAILABLE",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl From<InfoCode> for u8 {
    fn from(code: InfoCode) -> Self {
        code.as_u8()
    }
}

impl TryFrom<u8> for InfoCode {
    type Error = UnknownInfoCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_u8() == value)
            .ok_or(UnknownInfoCode(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown info code {0}, expected 1..=9")]
pub struct UnknownInfoCode(pub u8);

impl fmt::Display for InfoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod messages {
    pub const INVALID_EMAIL_STRUCTURE: &str = "Invalid email structure";
    pub const BANNED_BY_SERVER: &str = "Your IP has been banned by the SMTP server";
    pub const NO_MX_RECORDS: &str = "No MX records found";
    pub const DOMAIN_NOT_FOUND: &str = "Domain not found";
    pub const SMTP_UNAVAILABLE: &str = "Remote SMTP server wasn't available";
    pub const NETWORK_ERROR: &str = "Connection error";
    pub const NETWORK_TIMEOUT: &str = "Connection timeout";
}

/// Final report for one address.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub success: bool,
    pub info: String,
    pub addr: String,
    pub code: InfoCode,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub last_response: Option<String>,
}

impl VerificationResult {
    pub(crate) fn failure(addr: &str, code: InfoCode, info: impl Into<String>) -> Self {
        Self {
            success: false,
            info: info.into(),
            addr: addr.to_string(),
            code,
            last_response: None,
        }
    }

    pub(crate) fn with_reply(mut self, reply: &SmtpReply) -> Self {
        self.last_response = Some(reply.raw.clone());
        self
    }
}

static BAN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)blacklist|banned|block list").expect("valid ban pattern"));

/// True when the reply text reports that the client IP is blocked.
pub fn is_ban_notice(text: &str) -> bool {
    BAN_PATTERN.is_match(text)
}

pub(crate) fn invalid_structure(addr: &str) -> VerificationResult {
    VerificationResult::failure(
        addr,
        InfoCode::InvalidEmailStructure,
        messages::INVALID_EMAIL_STRUCTURE,
    )
}

pub(crate) fn from_lookup_failure(addr: &str, failure: &LookupFailure) -> VerificationResult {
    match failure {
        LookupFailure::DomainNotFound => {
            VerificationResult::failure(addr, InfoCode::DomainNotFound, messages::DOMAIN_NOT_FOUND)
        }
        LookupFailure::NoRecords => {
            VerificationResult::failure(addr, InfoCode::NoMxRecords, messages::NO_MX_RECORDS)
        }
        LookupFailure::Other(diagnostic) => {
            VerificationResult::failure(addr, InfoCode::UnknownError, diagnostic.clone())
        }
    }
}

pub(crate) fn timed_out(addr: &str) -> VerificationResult {
    VerificationResult::failure(
        addr,
        InfoCode::SmtpConnectionTimeout,
        messages::NETWORK_TIMEOUT,
    )
}

pub(crate) fn connection_error(addr: &str, err: &io::Error) -> VerificationResult {
    VerificationResult::failure(
        addr,
        InfoCode::SmtpConnectionError,
        format!("{}: {err}", messages::NETWORK_ERROR),
    )
}

pub(crate) fn closed_by_peer(addr: &str) -> VerificationResult {
    VerificationResult::failure(
        addr,
        InfoCode::SmtpUnavailable,
        format!(
            "{}: connection closed by remote host",
            messages::SMTP_UNAVAILABLE
        ),
    )
}

pub(crate) fn unavailable(addr: &str, reply: &SmtpReply) -> VerificationResult {
    VerificationResult::failure(
        addr,
        InfoCode::SmtpUnavailable,
        format!("{}: {}", messages::SMTP_UNAVAILABLE, reply.raw),
    )
    .with_reply(reply)
}

pub(crate) fn mail_from_rejected(addr: &str, reply: &SmtpReply) -> VerificationResult {
    VerificationResult::failure(
        addr,
        InfoCode::SmtpUnavailable,
        format!("MAIL FROM failed: {}", reply.raw),
    )
    .with_reply(reply)
}

/// Classifies the reply to `RCPT TO`.
///
/// An unconfirmed recipient keeps `FinishedVerification` with
/// `success == false` and the raw reply as info.
pub(crate) fn from_rcpt_reply(
    addr: &str,
    reply: &SmtpReply,
    ignore: Option<&str>,
) -> VerificationResult {
    let ignored = ignore
        .filter(|needle| !needle.is_empty())
        .is_some_and(|needle| reply.raw.contains(needle));

    if reply.code == Some(250) || ignored {
        VerificationResult {
            success: true,
            info: format!("{addr} is a valid email"),
            addr: addr.to_string(),
            code: InfoCode::FinishedVerification,
            last_response: Some(reply.raw.clone()),
        }
    } else if is_ban_notice(&reply.raw) {
        VerificationResult::failure(
            addr,
            InfoCode::BannedByServer,
            format!("{}: {}", messages::BANNED_BY_SERVER, reply.raw),
        )
        .with_reply(reply)
    } else {
        VerificationResult::failure(addr, InfoCode::FinishedVerification, reply.raw.clone())
            .with_reply(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "user@example.com";

    #[test]
    fn numeric_codes_are_stable_and_distinct() {
        let values: Vec<u8> = InfoCode::ALL.iter().map(|c| c.as_u8()).collect();
        assert_eq!(values, (1..=9).collect::<Vec<u8>>());
    }

    #[test]
    fn numeric_codes_convert_back() {
        assert_eq!(InfoCode::try_from(7), Ok(InfoCode::BannedByServer));
        assert_eq!(InfoCode::try_from(0), Err(UnknownInfoCode(0)));
        assert_eq!(InfoCode::try_from(10), Err(UnknownInfoCode(10)));
    }

    #[cfg(feature = "with-serde")]
    #[test]
    fn json_carries_the_numeric_code() {
        let reply = SmtpReply::parse_single("250 2.1.5 Ok");
        let result = from_rcpt_reply(ADDR, &reply, None);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["code"], serde_json::json!(1));

        let back: VerificationResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.code, InfoCode::FinishedVerification);
        assert!(serde_json::from_str::<InfoCode>("12").is_err());
    }

    #[test]
    fn accepted_recipient_is_success() {
        let reply = SmtpReply::parse_single("250 2.1.5 Ok");
        let result = from_rcpt_reply(ADDR, &reply, None);
        assert!(result.success);
        assert_eq!(result.code, InfoCode::FinishedVerification);
        assert_eq!(result.info, "user@example.com is a valid email");
        assert_eq!(result.last_response.as_deref(), Some("250 2.1.5 Ok"));
    }

    #[test]
    fn ignore_substring_turns_greylisting_into_success() {
        let reply = SmtpReply::parse_single("450 4.2.0 Greylisted, try later");
        assert!(!from_rcpt_reply(ADDR, &reply, None).success);
        assert!(from_rcpt_reply(ADDR, &reply, Some("450")).success);
        assert!(!from_rcpt_reply(ADDR, &reply, Some("")).success);
    }

    #[test]
    fn ban_notice_ignores_reply_digits() {
        for text in [
            "550 5.7.1 Client host blacklisted",
            "421 you are BANNED",
            "554 listed on our Block List",
        ] {
            let reply = SmtpReply::parse_single(text);
            let result = from_rcpt_reply(ADDR, &reply, None);
            assert_eq!(result.code, InfoCode::BannedByServer, "{text}");
            assert!(!result.success);
        }
        assert!(!is_ban_notice("550 mailbox unavailable"));
    }

    #[test]
    fn unknown_recipient_is_unconfirmed_but_finished() {
        let reply = SmtpReply::parse_single("550 5.1.1 User unknown");
        let result = from_rcpt_reply(ADDR, &reply, None);
        assert!(!result.success);
        assert_eq!(result.code, InfoCode::FinishedVerification);
        assert_eq!(result.info, "550 5.1.1 User unknown");
    }

    #[test]
    fn lookup_failures_map_to_codes() {
        let nx = from_lookup_failure(ADDR, &LookupFailure::DomainNotFound);
        assert_eq!(nx.code, InfoCode::DomainNotFound);
        assert_eq!(nx.info, messages::DOMAIN_NOT_FOUND);

        let empty = from_lookup_failure(ADDR, &LookupFailure::NoRecords);
        assert_eq!(empty.code, InfoCode::NoMxRecords);
        assert_eq!(empty.info, messages::NO_MX_RECORDS);

        let other = from_lookup_failure(ADDR, &LookupFailure::Other("SERVFAIL".into()));
        assert_eq!(other.code, InfoCode::UnknownError);
        assert_eq!(other.info, "SERVFAIL");
    }

    #[test]
    fn connection_error_keeps_io_message() {
        let err = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let result = connection_error(ADDR, &err);
        assert_eq!(result.code, InfoCode::SmtpConnectionError);
        assert_eq!(result.info, "Connection error: refused");
    }
}
