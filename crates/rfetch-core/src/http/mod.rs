//! Minimal HTTP request/response model shared by the transport, the
//! redirect follower and callers.
//!
//! Headers are kept as an ordered list of `(name, value)` pairs with
//! case-insensitive name lookup, which is all the fetch path needs.

mod cache_control;
mod cacheable;
mod headers;

pub use cache_control::{CacheControl, IMPLICIT_CACHE_TTL_MS};
pub use cacheable::{RequestProperties, ValidatorOption, VaryOption};
pub use headers::HeaderList;

/// Status codes the fetch path refers to by name.
pub mod status {
    pub const OK: u16 = 200;
    pub const MOVED_PERMANENTLY: u16 = 301;
    pub const FOUND: u16 = 302;
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_FOUND: u16 = 404;
}

pub const HOST: &str = "Host";
pub const LOCATION: &str = "Location";
pub const CACHE_CONTROL: &str = "Cache-Control";
pub const EXPIRES: &str = "Expires";
pub const DATE: &str = "Date";
pub const VARY: &str = "Vary";
pub const COOKIE: &str = "Cookie";
pub const COOKIE2: &str = "Cookie2";
pub const AUTHORIZATION: &str = "Authorization";

/// Outgoing request headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    headers: HeaderList,
}

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &HeaderList {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderList {
        &mut self.headers
    }

    pub fn lookup1(&self, name: &str) -> Option<&str> {
        self.headers.lookup1(name)
    }

    pub fn add(&mut self, name: &str, value: &str) {
        self.headers.add(name, value);
    }

    /// Replaces every value of `name` with a single `value`.
    pub fn replace(&mut self, name: &str, value: &str) {
        self.headers.replace(name, value);
    }

    /// Request properties that influence proxy cacheability of the response.
    pub fn properties(&self) -> RequestProperties {
        RequestProperties {
            has_cookie: self.headers.has(COOKIE),
            has_cookie2: self.headers.has(COOKIE2),
            has_authorization: self.headers.has(AUTHORIZATION),
        }
    }
}

/// Response status plus headers, filled in by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    status_code: Option<u16>,
    headers: HeaderList,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status code, or 0 if none has been set yet.
    pub fn status_code(&self) -> u16 {
        self.status_code.unwrap_or(0)
    }

    pub fn has_status_code(&self) -> bool {
        self.status_code.is_some()
    }

    pub fn set_status_code(&mut self, code: u16) {
        self.status_code = Some(code);
    }

    pub fn headers(&self) -> &HeaderList {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderList {
        &mut self.headers
    }

    pub fn add(&mut self, name: &str, value: &str) {
        self.headers.add(name, value);
    }

    pub fn replace(&mut self, name: &str, value: &str) {
        self.headers.replace(name, value);
    }

    /// The value of `name` if it appears exactly once.
    pub fn lookup1(&self, name: &str) -> Option<&str> {
        self.headers.lookup1(name)
    }

    /// Drops status and all headers.
    pub fn clear(&mut self) {
        self.status_code = None;
        self.headers.clear();
    }

    pub fn cache_control(&self) -> CacheControl {
        CacheControl::from_headers(&self.headers)
    }

    /// Freshness lifetime in milliseconds.
    ///
    /// Explicit `s-maxage`/`max-age` wins, then `Expires - Date`; `no-store`,
    /// `no-cache` and `private` yield 0; otherwise heuristically cacheable
    /// statuses get [`IMPLICIT_CACHE_TTL_MS`] and everything else 0.
    pub fn cache_ttl_ms(&self) -> u64 {
        self.cache_control().ttl_ms(self.status_code())
    }

    /// Rewrites Cache-Control so the freshness lifetime becomes `ttl_ms`.
    ///
    /// Other directives are preserved; `Expires` is removed since it would
    /// otherwise compete with the new max-age.
    pub fn set_cache_control_max_age(&mut self, ttl_ms: u64) {
        let mut directives: Vec<String> = self
            .headers
            .tokens(CACHE_CONTROL)
            .filter(|d| {
                let name = d.split('=').next().unwrap_or("").trim();
                !name.eq_ignore_ascii_case("max-age") && !name.eq_ignore_ascii_case("s-maxage")
            })
            .map(str::to_string)
            .collect();
        directives.push(format!("max-age={}", ttl_ms / 1000));
        self.headers.replace(CACHE_CONTROL, &directives.join(", "));
        self.headers.remove(EXPIRES);
    }

    /// Whether a shared (proxy) cache may store this response for a request
    /// with `request` properties.
    pub fn is_proxy_cacheable(
        &self,
        request: RequestProperties,
        vary: VaryOption,
        validator: ValidatorOption,
    ) -> bool {
        cacheable::is_proxy_cacheable(self, request, vary, validator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_properties_from_headers() {
        let mut req = RequestHeaders::new();
        assert_eq!(req.properties(), RequestProperties::default());
        req.add("cookie", "a=b");
        req.add("Authorization", "Bearer x");
        let props = req.properties();
        assert!(props.has_cookie);
        assert!(!props.has_cookie2);
        assert!(props.has_authorization);
    }

    #[test]
    fn clear_drops_status_and_headers() {
        let mut resp = ResponseHeaders::new();
        resp.set_status_code(status::FOUND);
        resp.add(LOCATION, "http://b.example.com/");
        resp.clear();
        assert!(!resp.has_status_code());
        assert_eq!(resp.status_code(), 0);
        assert!(resp.headers().is_empty());
    }

    #[test]
    fn set_max_age_keeps_other_directives_and_drops_expires() {
        let mut resp = ResponseHeaders::new();
        resp.set_status_code(status::OK);
        resp.add(CACHE_CONTROL, "public, max-age=60, s-maxage=120");
        resp.add(EXPIRES, "Wed, 21 Oct 2015 07:28:00 GMT");
        resp.set_cache_control_max_age(30_000);
        assert_eq!(resp.lookup1(CACHE_CONTROL), Some("public, max-age=30"));
        assert!(resp.lookup1(EXPIRES).is_none());
        assert_eq!(resp.cache_ttl_ms(), 30_000);
    }

    #[test]
    fn set_max_age_on_response_without_cache_control() {
        let mut resp = ResponseHeaders::new();
        resp.set_status_code(status::OK);
        assert_eq!(resp.cache_ttl_ms(), IMPLICIT_CACHE_TTL_MS);
        resp.set_cache_control_max_age(5_000);
        assert_eq!(resp.lookup1(CACHE_CONTROL), Some("max-age=5"));
        assert_eq!(resp.cache_ttl_ms(), 5_000);
    }
}
