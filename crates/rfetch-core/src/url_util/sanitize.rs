//! Canonical textual form for URLs taken from headers or user input.

/// Sanitizes a raw URL string into canonical form.
///
/// - Trims leading/trailing whitespace and control characters
/// - Drops embedded tab, CR and LF
/// - Percent-encodes space, other control characters, characters that are
///   never legal in a URL (`"`, `<`, `>`, `\`, `^`, `` ` ``, `{`, `|`, `}`)
///   and every non-ASCII byte
///
/// Existing escapes, `%`, and the fragment marker `#` are left untouched, so
/// callers can still detect fragments after sanitizing.
pub fn sanitize(raw: &str) -> String {
    let trimmed = raw.trim_matches(|c: char| c.is_ascii_whitespace() || c.is_control());

    let mut out = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        match c {
            '\t' | '\r' | '\n' => {}
            ' ' | '"' | '<' | '>' | '\\' | '^' | '`' | '{' | '|' | '}' => push_escaped(&mut out, c),
            c if c.is_control() || !c.is_ascii() => push_escaped(&mut out, c),
            c => out.push(c),
        }
    }
    out
}

fn push_escaped(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    for b in c.encode_utf8(&mut buf).bytes() {
        out.push_str(&format!("%{:02X}", b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_clean_urls_alone() {
        assert_eq!(
            sanitize("http://example.com/a/b?c=d&e=%20"),
            "http://example.com/a/b?c=d&e=%20"
        );
    }

    #[test]
    fn trims_and_drops_line_breaks() {
        assert_eq!(
            sanitize("  http://example.com/a\r\n/b\t "),
            "http://example.com/a/b"
        );
    }

    #[test]
    fn escapes_illegal_characters() {
        assert_eq!(
            sanitize("http://example.com/a b<c>"),
            "http://example.com/a%20b%3Cc%3E"
        );
        assert_eq!(sanitize("http://example.com/{x}|y"), "http://example.com/%7Bx%7D%7Cy");
    }

    #[test]
    fn escapes_non_ascii_as_utf8() {
        assert_eq!(sanitize("http://example.com/é"), "http://example.com/%C3%A9");
    }

    #[test]
    fn keeps_fragment_marker() {
        assert_eq!(sanitize("/page#top"), "/page#top");
    }
}
