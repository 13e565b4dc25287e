/// atext ASCII plus '.', never leading, trailing or doubled.
pub(crate) fn check_local(local: &str, reasons: &mut Vec<String>) {
    if local.is_empty() || local.len() > 64 {
        reasons.push(format!(
            "local part length {} invalid (1..=64)",
            local.len()
        ));
        return;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        reasons.push("local part has a misplaced '.'".to_string());
    }
    if !local.chars().all(is_atext_or_dot) {
        reasons.push("local part has invalid chars".to_string());
    }
}

fn is_atext_or_dot(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '*'
                | '+'
                | '-'
                | '/'
                | '='
                | '?'
                | '^'
                | '_'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
                | '.'
        )
}
