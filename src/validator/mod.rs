//! Structural e-mail checks performed before any network access.

mod domain;
mod local;
mod types;

pub use types::ValidationReport;

use domain::check_domain;
use local::check_local;

/// Validates `email` and lists every rule it breaks.
///
/// The input is checked as given: surrounding whitespace makes it invalid.
pub fn validate_email(email: &str) -> ValidationReport {
    let mut reasons = Vec::new();

    if email.trim().is_empty() {
        reasons.push("address is empty".to_string());
        return ValidationReport::from_reasons(reasons);
    }

    if email.chars().any(char::is_whitespace) {
        reasons.push("address contains whitespace".to_string());
    }

    if email.len() > 254 {
        reasons.push(format!("total length {} > 254", email.len()));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        reasons.push("must contain exactly one '@'".to_string());
        return ValidationReport::from_reasons(reasons);
    }
    let (local, domain) = (parts[0], parts[1]);

    check_local(local, &mut reasons);
    check_domain(domain, &mut reasons);

    ValidationReport::from_reasons(reasons)
}

/// Shorthand for `validate_email(email).ok`.
pub fn is_valid_structure(email: &str) -> bool {
    validate_email(email).ok
}

/// Lowercased substring after the last `@`.
pub fn domain_of(email: &str) -> String {
    email
        .rsplit('@')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}
