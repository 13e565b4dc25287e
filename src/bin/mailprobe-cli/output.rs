use anyhow::{Result, bail};
use mailprobe::{VerificationResult, VerifyError};

#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub addr: String,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub result: Option<VerificationResult>,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub error: Option<String>,
}

impl ReportRow {
    pub fn new(addr: &str, outcome: Result<VerificationResult, VerifyError>) -> Self {
        match outcome {
            Ok(result) => Self {
                addr: addr.to_string(),
                result: Some(result),
                error: None,
            },
            Err(err) => Self {
                addr: addr.to_string(),
                result: None,
                error: Some(err.to_string()),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.as_ref().is_some_and(|result| result.success)
    }
}

pub fn write_reports(rows: &[ReportRow], format: &str) -> Result<()> {
    match format {
        "human" => {
            if !rows.is_empty() {
                println!("{}", render_human(rows));
            }
            Ok(())
        }
        "json" => write_json(rows),
        other => bail!("unknown --format '{other}', use: human|json"),
    }
}

pub fn render_human(rows: &[ReportRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len());
    for row in rows {
        let line = match (&row.result, &row.error) {
            (Some(result), _) if result.success => {
                format!("[OK]    {} :: {}", row.addr, one_line(&result.info))
            }
            (Some(result), _) => format!(
                "[FAIL]  {} :: {} {}",
                row.addr,
                result.code,
                one_line(&result.info)
            ),
            (None, Some(error)) => format!("[ERROR] {} :: {error}", row.addr),
            (None, None) => format!("[ERROR] {} :: no result", row.addr),
        };
        lines.push(line);
    }
    lines.join("\n")
}

fn one_line(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join(" | ")
}

#[cfg(feature = "with-serde")]
fn write_json(rows: &[ReportRow]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_rows: &[ReportRow]) -> Result<()> {
    bail!("format=json requires the 'with-serde' feature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailprobe::InfoCode;

    fn result(addr: &str, success: bool, code: InfoCode, info: &str) -> VerificationResult {
        VerificationResult {
            success,
            info: info.to_string(),
            addr: addr.to_string(),
            code,
            last_response: None,
        }
    }

    #[test]
    fn human_report() {
        let rows = vec![
            ReportRow::new(
                "support@example.com",
                Ok(result(
                    "support@example.com",
                    true,
                    InfoCode::FinishedVerification,
                    "support@example.com is a valid email",
                )),
            ),
            ReportRow::new(
                "admin@nowhere.test",
                Ok(result(
                    "admin@nowhere.test",
                    false,
                    InfoCode::DomainNotFound,
                    "Domain not found",
                )),
            ),
            ReportRow::new(
                "x@example.com",
                Ok(result(
                    "x@example.com",
                    false,
                    InfoCode::SmtpUnavailable,
                    "Remote SMTP server wasn't available: 421-busy\n421 later",
                )),
            ),
            ReportRow::new("", Err(VerifyError::MissingEmail)),
        ];
        insta::assert_snapshot!(render_human(&rows), @r"
        [OK]    support@example.com :: support@example.com is a valid email
        [FAIL]  admin@nowhere.test :: DOMAIN_NOT_FOUND Domain not found
        [FAIL]  x@example.com :: SMTP_UNAVAILABLE Remote SMTP server wasn't available: 421-busy | 421 later
        [ERROR]  :: email param is mandatory
        ");
    }

    #[test]
    fn success_requires_a_positive_result() {
        let ok = ReportRow::new(
            "a@example.com",
            Ok(result("a@example.com", true, InfoCode::FinishedVerification, "ok")),
        );
        let unconfirmed = ReportRow::new(
            "b@example.com",
            Ok(result("b@example.com", false, InfoCode::FinishedVerification, "550")),
        );
        assert!(ok.is_success());
        assert!(!unconfirmed.is_success());
        assert!(!ReportRow::new("", Err(VerifyError::MissingEmail)).is_success());
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(write_reports(&[], "csv").is_err());
    }
}
