//! Text normalization applied before chunking.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EXCESS_NEWLINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

/// Normalize extracted text ahead of chunking.
///
/// Replaces CRLF and lone CR with LF, collapses runs of three or more
/// newlines to exactly two, and trims leading/trailing whitespace.
/// Idempotent: `normalize_text(normalize_text(x)) == normalize_text(x)`.
pub fn normalize_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let collapsed = EXCESS_NEWLINES.replace_all(&unified, "\n\n");
    collapsed.trim().to_string()
}
