//! Redirect-following fetcher.
//!
//! [`RedirectFollowingFetcher`] decorates a transport so that a caller gets
//! the final resource of a redirect chain through one [`AsyncFetch`] sink:
//!
//! - only 301 and 302 are followed, each target validated before it is fetched
//!   (cacheable redirect, single Location, no fragment, web-valid, hop limit,
//!   no cycle, authorized, allowed, mappable origin);
//! - the delivered response's cache lifetime never exceeds the smallest
//!   lifetime of any redirect in the chain;
//! - the caller's sink sees exactly one `done`: the final hop's real result,
//!   or a 404 failure with the redirect response discarded.

mod ceiling;
mod error;
mod hop;
mod validate;
mod visited;

pub use ceiling::CacheCeiling;
pub use error::{ConfigError, RedirectError, RedirectErrorKind};
pub use hop::is_followed_redirect;
pub use visited::VisitedUrls;

use std::sync::Arc;

use url::Url;

use crate::config::RedirectConfig;
use crate::fetch::{AsyncFetch, UrlFetcher};
use crate::http::status;
use crate::policy::RedirectPolicy;
use crate::url_util;
use hop::RedirectHop;

struct FetcherInner {
    transport: Arc<dyn UrlFetcher>,
    context_url: Url,
    max_redirects: usize,
    policy: Arc<dyn RedirectPolicy>,
}

/// Transport decorator that follows redirects. Cheap to clone; every hop of
/// every chain holds a clone so it can start the next hop.
#[derive(Clone)]
pub struct RedirectFollowingFetcher {
    inner: Arc<FetcherInner>,
}

impl std::fmt::Debug for RedirectFollowingFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectFollowingFetcher")
            .field("context_url", &self.inner.context_url.as_str())
            .field("max_redirects", &self.inner.max_redirects)
            .finish_non_exhaustive()
    }
}

/// Builder for [`RedirectFollowingFetcher`]; every field is required.
#[derive(Default)]
pub struct RedirectFollowingFetcherBuilder {
    transport: Option<Arc<dyn UrlFetcher>>,
    context_url: Option<String>,
    max_redirects: Option<usize>,
    policy: Option<Arc<dyn RedirectPolicy>>,
}

impl RedirectFollowingFetcherBuilder {
    pub fn transport(mut self, transport: Arc<dyn UrlFetcher>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn context_url(mut self, url: impl Into<String>) -> Self {
        self.context_url = Some(url.into());
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = Some(max);
        self
    }

    pub fn policy(mut self, policy: Arc<dyn RedirectPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<RedirectFollowingFetcher, ConfigError> {
        let transport = self.transport.ok_or(ConfigError::MissingTransport)?;
        let policy = self.policy.ok_or(ConfigError::MissingPolicy)?;
        let max_redirects = self.max_redirects.ok_or(ConfigError::MissingMaxRedirects)?;
        let raw_context = self.context_url.ok_or(ConfigError::MissingContextUrl)?;
        let context_url = url_util::parse_web_url(&url_util::sanitize(&raw_context))
            .ok_or(ConfigError::InvalidContextUrl(raw_context))?;
        Ok(RedirectFollowingFetcher {
            inner: Arc::new(FetcherInner {
                transport,
                context_url,
                max_redirects,
                policy,
            }),
        })
    }
}

/// Canonical key for the visited set: sanitized, then normalized by the URL
/// parser when it parses.
fn visited_key(url: &str) -> String {
    let sanitized = url_util::sanitize(url);
    match url_util::parse_web_url(&sanitized) {
        Some(parsed) => parsed.to_string(),
        None => sanitized,
    }
}

impl RedirectFollowingFetcher {
    pub fn builder() -> RedirectFollowingFetcherBuilder {
        RedirectFollowingFetcherBuilder::default()
    }

    /// Builds from the `[redirect]` config section. `default_context` is used
    /// when the section names no context URL.
    pub fn from_config(
        cfg: &RedirectConfig,
        default_context: &str,
        transport: Arc<dyn UrlFetcher>,
        policy: Arc<dyn RedirectPolicy>,
    ) -> Result<Self, ConfigError> {
        Self::builder()
            .transport(transport)
            .policy(policy)
            .max_redirects(cfg.max_redirects)
            .context_url(cfg.context_url.as_deref().unwrap_or(default_context))
            .build()
    }

    pub fn context_url(&self) -> &Url {
        &self.inner.context_url
    }

    pub fn max_redirects(&self) -> usize {
        self.inner.max_redirects
    }

    pub(crate) fn policy(&self) -> &dyn RedirectPolicy {
        self.inner.policy.as_ref()
    }

    /// Starts a new chain at `url`. An invalid URL fails the sink at once
    /// with 400 and nothing is fetched.
    pub fn fetch(&self, url: &str, fetch: Box<dyn AsyncFetch>) {
        let visited = VisitedUrls::new(visited_key(url));
        self.start_hop(url, fetch, visited, CacheCeiling::unset(), false);
    }

    /// Continues a chain at `url`, taking over its visited set and ceiling.
    pub fn follow_redirect(
        &self,
        url: &str,
        fetch: Box<dyn AsyncFetch>,
        visited: VisitedUrls,
        ceiling: CacheCeiling,
    ) {
        self.start_hop(url, fetch, visited, ceiling, true);
    }

    fn start_hop(
        &self,
        url: &str,
        mut fetch: Box<dyn AsyncFetch>,
        visited: VisitedUrls,
        ceiling: CacheCeiling,
        is_redirect: bool,
    ) {
        let Some(parsed) = url_util::parse_web_url(url) else {
            if is_redirect {
                tracing::warn!(url, "declining to follow bad redirect url");
            } else {
                tracing::warn!(url, "declining to fetch bad url");
            }
            fetch
                .response_headers_mut()
                .set_status_code(status::BAD_REQUEST);
            fetch.done(false);
            return;
        };

        let hop = RedirectHop::new(self.clone(), fetch, parsed, visited, ceiling);
        tracing::debug!(url, hop = hop.hop_count(), "issuing fetch");
        self.inner.transport.fetch(url, Box::new(hop));
    }
}

impl UrlFetcher for RedirectFollowingFetcher {
    fn fetch(&self, url: &str, fetch: Box<dyn AsyncFetch>) {
        RedirectFollowingFetcher::fetch(self, url, fetch);
    }

    fn supports_https(&self) -> bool {
        self.inner.transport.supports_https()
    }
}
