//! SMTP reply parser.

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// Parses an SMTP reply from accumulated response lines.
///
/// Replies can be single-line or multi-line:
/// - Single: `250 OK\r\n`
/// - Multi: `250-First line\r\n250-Second line\r\n250 Last line\r\n`
///
/// # Errors
///
/// Returns an error if any line is malformed or the code is not numeric.
pub fn parse_reply(lines: &[String]) -> Result<Reply> {
    let Some(first) = lines.first() else {
        return Err(Error::MalformedReply("empty reply".into()));
    };

    if first.len() < 3 {
        return Err(Error::MalformedReply(format!("reply too short: {first:?}")));
    }

    let code_str = &first[0..3];
    let code = code_str
        .parse::<u16>()
        .map_err(|_| Error::MalformedReply(format!("invalid reply code: {code_str:?}")))?;

    let mut text = Vec::new();
    for line in lines {
        if line.len() >= 4 {
            // Skip code and separator ("250-" or "250 ")
            text.push(line[4..].to_string());
        } else if line.len() == 3 {
            // Bare code with no message
            text.push(String::new());
        } else {
            return Err(Error::MalformedReply(format!("malformed line: {line:?}")));
        }
    }

    Ok(Reply::new(ReplyCode::new(code), text))
}

/// Returns true if `line` terminates a (possibly multi-line) reply.
///
/// Continuation lines carry `-` in the fourth column; the terminal line
/// carries a space there. A bare three-character code also terminates.
#[must_use]
pub fn is_terminal_line(line: &str) -> bool {
    match line.as_bytes().get(3) {
        Some(b' ') => true,
        Some(_) => false,
        None => line.len() == 3,
    }
}
