//! HTTP header line extraction.
//!
//! No HTTP grammar is applied: the payload is split on CRLF and the blank
//! line plus body that follow the last header line are dropped.

use tracing::trace;

const LINE_SEPARATOR: &str = "\r\n";

/// Split a TCP payload into HTTP header lines.
///
/// Invalid UTF-8 is replaced, never rejected. Payloads with two or fewer
/// CRLF separated pieces yield nothing.
pub fn split_header_lines(payload: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(payload);
    let mut lines: Vec<String> = text.split(LINE_SEPARATOR).map(String::from).collect();

    if lines.len() <= 2 {
        trace!("{} line(s) in http payload, nothing to report", lines.len());
        return vec![];
    }

    lines.truncate(lines.len() - 2);
    lines
}
