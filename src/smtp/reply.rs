/// One complete SMTP reply, possibly spanning several lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    /// Status code of the reply, `None` when the server sent no numeric code.
    pub code: Option<u16>,
    /// Text after the status code, one entry per line.
    pub lines: Vec<String>,
    /// The reply as received, CR stripped, lines joined with `\n`.
    pub raw: String,
}

impl SmtpReply {
    #[cfg(test)]
    pub(crate) fn parse_single(line: &str) -> Self {
        let mut builder = ReplyBuilder::default();
        builder.push(line);
        builder.finish()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ReplyLine<'a> {
    pub code: Option<u16>,
    pub continuation: bool,
    pub text: &'a str,
}

/// Splits `line` into code, continuation marker and text.
///
/// `250-PIPELINING` is a continuation, `250 OK` and `250` are final lines.
/// Anything not starting with three digits is a final line without code.
pub(crate) fn parse_line(line: &str) -> ReplyLine<'_> {
    let bytes = line.as_bytes();
    let has_code = bytes.len() >= 3 && bytes[..3].iter().all(u8::is_ascii_digit);
    if !has_code {
        return ReplyLine {
            code: None,
            continuation: false,
            text: line,
        };
    }

    match bytes.get(3) {
        None => ReplyLine {
            code: line[..3].parse().ok(),
            continuation: false,
            text: "",
        },
        Some(b'-') | Some(b' ') => ReplyLine {
            code: line[..3].parse().ok(),
            continuation: bytes[3] == b'-',
            text: &line[4..],
        },
        Some(_) => ReplyLine {
            code: None,
            continuation: false,
            text: line,
        },
    }
}

#[derive(Debug, Default)]
pub(crate) struct ReplyBuilder {
    code: Option<u16>,
    lines: Vec<String>,
    raw: Vec<String>,
}

impl ReplyBuilder {
    /// Adds one line (without line terminator). Returns `true` once the
    /// reply is complete.
    pub(crate) fn push(&mut self, line: &str) -> bool {
        let parsed = parse_line(line);
        // the final line carries the authoritative code
        if self.raw.is_empty() || !parsed.continuation {
            self.code = parsed.code;
        }
        self.lines.push(parsed.text.to_string());
        self.raw.push(line.to_string());
        !parsed.continuation
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub(crate) fn finish(self) -> SmtpReply {
        SmtpReply {
            code: self.code,
            lines: self.lines,
            raw: self.raw.join("\n"),
        }
    }
}
