//! Validation of a completed redirect response.
//!
//! Steps run in a fixed order and the first failure wins:
//! cacheability, Location lookup, fragment check, resolution, hop limit,
//! cycle check, domain authorization, allow-list, origin mapping.

use super::hop::RedirectHop;
use super::RedirectError;
use crate::fetch::UrlFetcher;
use crate::http::{HOST, LOCATION};
use crate::url_util;

impl RedirectHop {
    /// Decides where the chain goes next. On success returns the URL to fetch
    /// (already origin-mapped); the visited set, cache ceiling and request
    /// Host header have been updated along the way.
    pub(super) fn next_hop(&mut self, transport_success: bool) -> Result<String, RedirectError> {
        let fetcher = self.fetcher.clone();
        let policy = fetcher.policy();

        if transport_success {
            let response = self.base.response_headers();
            let request = self.base.request_headers().properties();
            if !response.is_proxy_cacheable(request, policy.vary_option(), policy.validator_option())
            {
                return Err(RedirectError::UncacheableRedirect {
                    url: self.url.to_string(),
                });
            }
            self.ceiling.lower(response.cache_ttl_ms());
        }

        let raw_location = match self.base.response_headers().lookup1(LOCATION) {
            None => {
                return Err(RedirectError::MissingOrEmptyLocation {
                    url: self.url.to_string(),
                    reason: "failed looking up exactly one Location header",
                })
            }
            Some(value) if value.trim().is_empty() => {
                return Err(RedirectError::MissingOrEmptyLocation {
                    url: self.url.to_string(),
                    reason: "empty Location header value",
                })
            }
            Some(value) => value,
        };

        // A redirect whose body never finished is not followed, even though
        // its headers were usable.
        if !transport_success {
            return Err(RedirectError::FetchFailed {
                url: self.url.to_string(),
            });
        }

        let location = url_util::sanitize(raw_location);
        if location.contains('#') {
            return Err(RedirectError::FragmentUnsupported { location });
        }

        let target = url_util::resolve(&self.url, &location)
            .ok_or(RedirectError::MalformedUrl { location })?;
        let target_str = target.to_string();

        if self.visited.len() > fetcher.max_redirects() {
            return Err(RedirectError::TooManyRedirects {
                max: fetcher.max_redirects(),
                location: target_str,
            });
        }

        if !self.visited.insert(target_str.clone()) {
            return Err(RedirectError::CyclicRedirect {
                location: target_str,
            });
        }

        if !policy.is_domain_authorized(fetcher.context_url(), &target) {
            return Err(RedirectError::Unauthorized {
                context: fetcher.context_url().to_string(),
                location: target_str,
            });
        }

        if !policy.is_allowed(target.as_str()) {
            return Err(RedirectError::Disallowed {
                location: target_str,
            });
        }

        let mapping = policy
            .map_origin_url(&target)
            .ok_or(RedirectError::OriginMappingFailure {
                location: target_str,
            })?;
        if mapping.url.scheme() == "https" && !fetcher.supports_https() {
            return Err(RedirectError::UnsupportedSecureTransport {
                location: mapping.url.to_string(),
            });
        }
        if !mapping.is_proxy {
            self.base
                .request_headers_mut()
                .replace(HOST, &mapping.host_header);
        }

        tracing::debug!(
            from = %self.url,
            to = %mapping.url,
            hops = self.hop_count(),
            "following redirect"
        );
        Ok(mapping.url.to_string())
    }
}
