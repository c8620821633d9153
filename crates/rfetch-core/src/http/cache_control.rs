//! Cache-Control parsing and freshness lifetime.

use chrono::{DateTime, Utc};

use super::{HeaderList, CACHE_CONTROL, DATE, EXPIRES};

/// Freshness lifetime given to heuristically cacheable responses that carry
/// no explicit max-age (5 minutes).
pub const IMPLICIT_CACHE_TTL_MS: u64 = 300_000;

/// Statuses a cache may store without explicit freshness information.
const HEURISTICALLY_CACHEABLE: [u16; 5] = [200, 203, 300, 301, 410];

/// Parsed Cache-Control directives relevant to shared caching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheControl {
    pub max_age_secs: Option<u64>,
    pub s_maxage_secs: Option<u64>,
    pub no_store: bool,
    pub no_cache: bool,
    pub private: bool,
    pub public: bool,
    pub must_revalidate: bool,
    /// Lifetime implied by `Expires - Date`, when `Expires` is present.
    pub expires_ms: Option<u64>,
}

fn http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// `Expires - Date` in milliseconds, clamped at 0. A missing `Date` counts
/// as now; an unparseable `Expires` (e.g. "0") means already expired.
fn expires_lifetime_ms(headers: &HeaderList) -> Option<u64> {
    let expires = headers.lookup1(EXPIRES)?;
    let Some(expires) = http_date(expires) else {
        return Some(0);
    };
    let date = headers
        .lookup1(DATE)
        .and_then(http_date)
        .unwrap_or_else(Utc::now);
    let lifetime = expires.signed_duration_since(date).num_milliseconds();
    Some(u64::try_from(lifetime).unwrap_or(0))
}

impl CacheControl {
    /// Collects directives from every Cache-Control header in `headers`.
    /// Unknown directives are ignored; a malformed numeric value makes the
    /// directive count as absent.
    pub fn from_headers(headers: &HeaderList) -> Self {
        let mut cc = CacheControl::default();
        for directive in headers.tokens(CACHE_CONTROL) {
            let (name, value) = match directive.split_once('=') {
                Some((n, v)) => (n.trim(), Some(v.trim().trim_matches('"'))),
                None => (directive, None),
            };
            let seconds = value.and_then(|v| v.parse::<u64>().ok());
            match name.to_ascii_lowercase().as_str() {
                "max-age" => cc.max_age_secs = seconds.or(cc.max_age_secs),
                "s-maxage" => cc.s_maxage_secs = seconds.or(cc.s_maxage_secs),
                "no-store" => cc.no_store = true,
                "no-cache" => cc.no_cache = true,
                "private" => cc.private = true,
                "public" => cc.public = true,
                "must-revalidate" | "proxy-revalidate" => cc.must_revalidate = true,
                _ => {}
            }
        }
        cc.expires_ms = expires_lifetime_ms(headers);
        cc
    }

    /// True if some directive forbids storing the response in a shared cache.
    pub fn forbids_shared_storage(&self) -> bool {
        self.no_store || self.no_cache || self.private
    }

    /// True if the response states its own freshness lifetime.
    pub fn has_explicit_lifetime(&self) -> bool {
        self.s_maxage_secs.is_some() || self.max_age_secs.is_some() || self.expires_ms.is_some()
    }

    /// Freshness lifetime in milliseconds for a response with `status`.
    ///
    /// `s-maxage` beats `max-age`, which beats `Expires`; only without any of
    /// them does the heuristic default apply.
    pub fn ttl_ms(&self, status: u16) -> u64 {
        if self.forbids_shared_storage() {
            return 0;
        }
        let explicit = self
            .s_maxage_secs
            .or(self.max_age_secs)
            .map(|secs| secs.saturating_mul(1000))
            .or(self.expires_ms);
        match explicit {
            Some(ms) => ms,
            None if HEURISTICALLY_CACHEABLE.contains(&status) => IMPLICIT_CACHE_TTL_MS,
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cc(value: &str) -> CacheControl {
        let mut h = HeaderList::new();
        h.add(CACHE_CONTROL, value);
        CacheControl::from_headers(&h)
    }

    #[test]
    fn parses_directives() {
        let c = cc("public, max-age=60, must-revalidate");
        assert!(c.public);
        assert!(c.must_revalidate);
        assert_eq!(c.max_age_secs, Some(60));
        assert!(!c.forbids_shared_storage());
    }

    #[test]
    fn s_maxage_wins_over_max_age() {
        assert_eq!(cc("max-age=60, s-maxage=10").ttl_ms(200), 10_000);
    }

    #[test]
    fn forbidding_directives_zero_the_ttl() {
        assert_eq!(cc("max-age=60, private").ttl_ms(200), 0);
        assert_eq!(cc("no-store").ttl_ms(200), 0);
        assert_eq!(cc("no-cache, max-age=60").ttl_ms(301), 0);
    }

    #[test]
    fn implicit_ttl_depends_on_status() {
        let none = CacheControl::default();
        assert_eq!(none.ttl_ms(200), IMPLICIT_CACHE_TTL_MS);
        assert_eq!(none.ttl_ms(301), IMPLICIT_CACHE_TTL_MS);
        assert_eq!(none.ttl_ms(302), 0);
        assert_eq!(none.ttl_ms(404), 0);
    }

    #[test]
    fn malformed_max_age_is_ignored() {
        let c = cc("max-age=soon");
        assert_eq!(c.max_age_secs, None);
        assert!(!c.has_explicit_lifetime());
        assert_eq!(c.ttl_ms(302), 0);
    }

    fn with_dates(date: Option<&str>, expires: &str) -> CacheControl {
        let mut h = HeaderList::new();
        if let Some(date) = date {
            h.add(DATE, date);
        }
        h.add(EXPIRES, expires);
        CacheControl::from_headers(&h)
    }

    #[test]
    fn expires_minus_date_gives_the_lifetime() {
        let c = with_dates(
            Some("Sun, 06 Nov 1994 08:00:00 GMT"),
            "Sun, 06 Nov 1994 09:00:00 GMT",
        );
        assert_eq!(c.expires_ms, Some(3_600_000));
        assert!(c.has_explicit_lifetime());
        assert_eq!(c.ttl_ms(302), 3_600_000);
    }

    #[test]
    fn expires_equal_to_date_is_not_fresh() {
        let c = with_dates(
            Some("Sun, 06 Nov 1994 08:49:37 GMT"),
            "Sun, 06 Nov 1994 08:49:37 GMT",
        );
        assert_eq!(c.ttl_ms(200), 0);
    }

    #[test]
    fn past_or_invalid_expires_is_zero() {
        let past = with_dates(
            Some("Sun, 06 Nov 1994 09:00:00 GMT"),
            "Sun, 06 Nov 1994 08:00:00 GMT",
        );
        assert_eq!(past.ttl_ms(200), 0);
        assert_eq!(with_dates(None, "0").ttl_ms(200), 0);
    }

    #[test]
    fn expires_without_date_is_relative_to_now() {
        let c = with_dates(None, "Fri, 01 Jan 2100 00:00:00 GMT");
        assert!(c.ttl_ms(302) > 0);
    }

    #[test]
    fn max_age_beats_expires() {
        let mut h = HeaderList::new();
        h.add(CACHE_CONTROL, "max-age=10");
        h.add(DATE, "Sun, 06 Nov 1994 08:00:00 GMT");
        h.add(EXPIRES, "Sun, 06 Nov 1994 09:00:00 GMT");
        assert_eq!(CacheControl::from_headers(&h).ttl_ms(200), 10_000);
    }

    #[test]
    fn quoted_values_are_accepted() {
        assert_eq!(cc("max-age=\"30\"").max_age_secs, Some(30));
    }
}
