//! Destination policy consulted before following a redirect.
//!
//! The redirect follower only depends on [`RedirectPolicy`]; [`DomainPolicy`]
//! is the configuration-driven implementation used by the CLI.

mod domain;
mod pattern;

pub use domain::{DomainPolicy, PolicyError};
pub use pattern::WildcardPattern;

use url::Url;

use crate::http::{ValidatorOption, VaryOption};

/// Physical fetch target for a logical URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginMapping {
    /// URL to actually request.
    pub url: Url,
    /// Host header to send when not proxying.
    pub host_header: String,
    /// True if the mapped origin is a proxy that expects the original Host.
    pub is_proxy: bool,
}

pub trait RedirectPolicy: Send + Sync {
    /// May `candidate` be fetched on behalf of a page at `context`?
    fn is_domain_authorized(&self, context: &Url, candidate: &Url) -> bool;

    /// Is fetching `url` permitted at all?
    fn is_allowed(&self, url: &str) -> bool;

    /// Maps a logical URL to its physical origin. `None` means the URL could
    /// not be mapped, which should not happen for an authorized URL.
    fn map_origin_url(&self, url: &Url) -> Option<OriginMapping>;

    fn vary_option(&self) -> VaryOption {
        VaryOption::Respect
    }

    fn validator_option(&self) -> ValidatorOption {
        ValidatorOption::NoValidator
    }
}

/// `host` or `host:port` when the port is not the scheme default.
pub(crate) fn host_and_port(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}
