use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// Knobs for [`verify`](crate::verify) and [`verify_all`](crate::verify_all).
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOptions {
    /// SMTP port of the mail exchanger.
    pub port: u16,
    /// Envelope sender used in `MAIL FROM`.
    pub sender: String,
    /// Budget for the whole SMTP probe in milliseconds; `<= 0` disables it.
    pub timeout_ms: i64,
    /// Name announced in `EHLO`.
    pub fqdn: String,
    /// DNS servers (`ip` or `ip:port`) replacing the system configuration.
    pub dns: Vec<String>,
    /// Substring that, found in the `RCPT TO` reply, counts as acceptance
    /// (e.g. `"450"` for greylisting servers).
    pub ignore: Option<String>,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            port: 25,
            sender: "name@example.org".to_string(),
            timeout_ms: 5_000,
            fqdn: "mail.example.org".to_string(),
            dns: Vec::new(),
            ignore: None,
        }
    }
}

impl VerifyOptions {
    /// The probe timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        u64::try_from(self.timeout_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    pub fn ignore(&self) -> Option<&str> {
        self.ignore.as_deref().filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = VerifyOptions::default();
        assert_eq!(options.port, 25);
        assert_eq!(options.sender, "name@example.org");
        assert_eq!(options.fqdn, "mail.example.org");
        assert_eq!(options.timeout(), Some(Duration::from_secs(5)));
        assert!(options.dns.is_empty());
        assert_eq!(options.ignore(), None);
    }

    #[test]
    fn non_positive_timeout_disables_timer() {
        for timeout_ms in [0, -1, i64::MIN] {
            let options = VerifyOptions {
                timeout_ms,
                ..VerifyOptions::default()
            };
            assert_eq!(options.timeout(), None);
        }
    }

    #[test]
    fn empty_ignore_is_no_ignore() {
        let options = VerifyOptions {
            ignore: Some(String::new()),
            ..VerifyOptions::default()
        };
        assert_eq!(options.ignore(), None);
    }
}
