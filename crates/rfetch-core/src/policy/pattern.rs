//! Wildcard patterns for hosts and URLs.

use regex::Regex;

/// A `*`/`?` wildcard pattern compiled to an anchored, case-insensitive regex.
///
/// `*` matches any run of characters (including none), `?` exactly one.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    source: String,
    regex: Regex,
}

impl WildcardPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let mut regex_str = String::with_capacity(pattern.len() + 8);
        regex_str.push_str("(?i)^");
        for ch in pattern.chars() {
            match ch {
                '*' => regex_str.push_str(".*"),
                '?' => regex_str.push('.'),
                c => regex_str.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
            }
        }
        regex_str.push('$');
        Ok(Self {
            source: pattern.to_string(),
            regex: Regex::new(&regex_str)?,
        })
    }

    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}
