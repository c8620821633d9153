//! Shared-cache (proxy) cacheability rules.

use super::{ResponseHeaders, VARY};

/// Request properties that change whether a response may be shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestProperties {
    pub has_cookie: bool,
    pub has_cookie2: bool,
    pub has_authorization: bool,
}

/// How `Vary` fields other than Accept-Encoding and Cookie are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VaryOption {
    /// Any other Vary field makes the response uncacheable.
    #[default]
    Respect,
    /// Other Vary fields are ignored.
    Ignore,
}

impl VaryOption {
    pub fn from_respect_vary(respect: bool) -> Self {
        if respect {
            VaryOption::Respect
        } else {
            VaryOption::Ignore
        }
    }
}

/// Whether the cached entry will carry a validator (ETag/Last-Modified)
/// that lets it be revalidated per client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidatorOption {
    HasValidator,
    #[default]
    NoValidator,
}

pub(super) fn is_proxy_cacheable(
    response: &ResponseHeaders,
    request: RequestProperties,
    vary: VaryOption,
    validator: ValidatorOption,
) -> bool {
    let cc = response.cache_control();
    if cc.forbids_shared_storage() || cc.ttl_ms(response.status_code()) == 0 {
        return false;
    }

    // Authenticated responses are private unless the origin opts in.
    if request.has_authorization && !(cc.public || cc.s_maxage_secs.is_some() || cc.must_revalidate)
    {
        return false;
    }

    let has_cookie = request.has_cookie || request.has_cookie2;
    for field in response.headers().tokens(VARY) {
        if field == "*" {
            return false;
        }
        if field.eq_ignore_ascii_case("accept-encoding") {
            continue;
        }
        if field.eq_ignore_ascii_case("cookie") {
            if has_cookie || validator == ValidatorOption::HasValidator {
                return false;
            }
            continue;
        }
        if vary == VaryOption::Respect {
            return false;
        }
    }
    true
}
