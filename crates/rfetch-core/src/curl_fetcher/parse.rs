//! Parse raw response header lines into `ResponseHeaders`.

use crate::http::ResponseHeaders;

/// Status code from a line like `HTTP/1.1 302 Found` or `HTTP/2 200`.
pub(crate) fn parse_status_line(line: &str) -> Option<u16> {
    let rest = line.strip_prefix("HTTP/")?;
    let mut parts = rest.split_whitespace();
    let _version = parts.next()?;
    parts.next()?.parse::<u16>().ok()
}

/// Fills `response` from collected header lines. Only lines after the last
/// status line count (earlier ones belong to interim 1xx responses).
pub(crate) fn apply_header_lines(lines: &[String], response: &mut ResponseHeaders) {
    let start = lines
        .iter()
        .rposition(|l| l.starts_with("HTTP/"))
        .unwrap_or(0);

    for line in &lines[start..] {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(code) = parse_status_line(line) {
            response.set_status_code(code);
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            response.add(name.trim(), value.trim());
        }
    }
}
