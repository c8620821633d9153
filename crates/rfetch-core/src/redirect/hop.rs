//! One hop of a redirect chain.
//!
//! A [`RedirectHop`] wraps the caller's sink for the duration of one
//! transport fetch. Non-redirect responses pass straight through; redirect
//! responses are swallowed and, once complete, validated and turned into the
//! next hop.

use url::Url;

use super::{CacheCeiling, RedirectFollowingFetcher, VisitedUrls};
use crate::fetch::AsyncFetch;
use crate::http::{status, RequestHeaders, ResponseHeaders};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum HopState {
    AwaitingHeaders,
    Passthrough,
    RedirectPending,
}

/// Only permanent and temporary redirects are followed; other 3xx codes are
/// delivered to the caller as ordinary responses.
pub fn is_followed_redirect(status_code: u16) -> bool {
    status_code == status::MOVED_PERMANENTLY || status_code == status::FOUND
}

pub(crate) struct RedirectHop {
    pub(super) fetcher: RedirectFollowingFetcher,
    pub(super) base: Box<dyn AsyncFetch>,
    pub(super) url: Url,
    pub(super) visited: VisitedUrls,
    pub(super) ceiling: CacheCeiling,
    pub(super) state: HopState,
}

impl RedirectHop {
    pub(super) fn new(
        fetcher: RedirectFollowingFetcher,
        base: Box<dyn AsyncFetch>,
        url: Url,
        visited: VisitedUrls,
        ceiling: CacheCeiling,
    ) -> Self {
        Self {
            fetcher,
            base,
            url,
            visited,
            ceiling,
            state: HopState::AwaitingHeaders,
        }
    }

    /// Hops taken so far, including this one.
    pub(super) fn hop_count(&self) -> usize {
        self.visited.len()
    }

    fn clamp_to_ceiling(&mut self) {
        let Some(limit) = self.ceiling.get() else {
            return;
        };
        let response = self.base.response_headers_mut();
        if response.cache_ttl_ms() > limit {
            tracing::debug!(url = %self.url, limit_ms = limit, "clamping cache lifetime");
            response.set_cache_control_max_age(limit);
        }
    }
}

impl AsyncFetch for RedirectHop {
    fn request_headers(&self) -> &RequestHeaders {
        self.base.request_headers()
    }

    fn request_headers_mut(&mut self) -> &mut RequestHeaders {
        self.base.request_headers_mut()
    }

    fn response_headers(&self) -> &ResponseHeaders {
        self.base.response_headers()
    }

    fn response_headers_mut(&mut self) -> &mut ResponseHeaders {
        self.base.response_headers_mut()
    }

    fn headers_complete(&mut self) {
        if is_followed_redirect(self.base.response_headers().status_code()) {
            self.state = HopState::RedirectPending;
            return;
        }
        self.state = HopState::Passthrough;
        self.clamp_to_ceiling();
        self.base.headers_complete();
    }

    fn write(&mut self, content: &[u8]) -> bool {
        match self.state {
            HopState::RedirectPending => true,
            _ => self.base.write(content),
        }
    }

    fn flush(&mut self) -> bool {
        match self.state {
            HopState::RedirectPending => true,
            _ => self.base.flush(),
        }
    }

    fn done(self: Box<Self>, success: bool) {
        let mut hop = *self;
        if hop.state != HopState::RedirectPending {
            hop.base.done(success);
            return;
        }

        let next = hop.next_hop(success);

        // The 3xx response is never exposed: the next hop refills the headers,
        // or the caller sees a bare 404.
        hop.base.response_headers_mut().clear();

        let RedirectHop {
            fetcher,
            mut base,
            visited,
            ceiling,
            ..
        } = hop;
        match next {
            Ok(next_url) => fetcher.follow_redirect(&next_url, base, visited, ceiling),
            Err(err) => {
                err.log();
                base.response_headers_mut()
                    .set_status_code(status::NOT_FOUND);
                base.done(false);
            }
        }
    }
}
