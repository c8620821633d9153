//! URL validation, sanitization and resolution.
//!
//! Thin layer over the `url` crate that answers the three questions the
//! redirect follower asks of every URL: is it a fetchable web URL, what is
//! its canonical textual form, and where does a relative reference point.

mod sanitize;

pub use sanitize::sanitize;

use url::Url;

/// Schemes the fetcher is willing to request.
const WEB_SCHEMES: [&str; 2] = ["http", "https"];

/// Parses `raw` and returns it only if it is a web-valid absolute URL:
/// http or https, with a non-empty host.
pub fn parse_web_url(raw: &str) -> Option<Url> {
    let parsed = Url::parse(raw).ok()?;
    is_web_url(&parsed).then_some(parsed)
}

/// True if `raw` parses as an absolute http/https URL with a host.
pub fn is_web_valid(raw: &str) -> bool {
    parse_web_url(raw).is_some()
}

/// True if an already-parsed URL is one the fetcher supports.
pub fn is_web_url(url: &Url) -> bool {
    WEB_SCHEMES.contains(&url.scheme()) && url.host_str().is_some_and(|h| !h.is_empty())
}

/// Resolves `reference` against `base`. Returns `None` when the result is not
/// a web-valid URL (unparseable, unsupported scheme, or no host).
pub fn resolve(base: &Url, reference: &str) -> Option<Url> {
    let joined = base.join(reference).ok()?;
    is_web_url(&joined).then_some(joined)
}
