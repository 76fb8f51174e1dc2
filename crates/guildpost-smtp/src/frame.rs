//! DATA payload framing: line-ending normalization and dot-stuffing.
//!
//! The terminating `.` line is written separately by the connection; it is
//! never part of the framed payload.

/// Maps any of `\n`, `\r`, `\r\n` uniformly to CRLF. Idempotent.
#[must_use]
pub fn normalize_crlf(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\r\n");
            }
            '\n' => out.push_str("\r\n"),
            _ => out.push(c),
        }
    }

    out
}

/// Doubles the leading `.` of any line so the payload cannot be mistaken for
/// the end-of-data terminator. Inverse of the receiver's de-stuffing.
///
/// Expects CRLF-delimited input; apply [`normalize_crlf`] first.
#[must_use]
pub fn dot_stuff(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut at_line_start = true;

    for c in text.chars() {
        if at_line_start && c == '.' {
            out.push('.');
        }
        out.push(c);
        at_line_start = c == '\n';
    }

    out
}

/// Prepares a message for the DATA stage: normalization then stuffing,
/// applied once, immediately before transmission.
#[must_use]
pub fn frame_body(text: &str) -> String {
    dot_stuff(&normalize_crlf(text))
}
