//! Redirect hop failures and fetcher configuration errors.

use thiserror::Error;

/// Why a redirect hop was not followed. Every variant names the URL that
/// was being processed when the hop failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedirectError {
    #[error("invalid or unsupported url in Location header: {location}")]
    MalformedUrl { location: String },

    #[error("uncacheable redirect response for {url}")]
    UncacheableRedirect { url: String },

    #[error("{reason}: {url}")]
    MissingOrEmptyLocation { url: String, reason: &'static str },

    #[error("declining redirect to '{location}': fragments are not supported")]
    FragmentUnsupported { location: String },

    #[error("max redirects ({max}) exceeded, not redirecting to {location}")]
    TooManyRedirects { max: usize, location: String },

    #[error("cyclic redirect detected, aborting: {location}")]
    CyclicRedirect { location: String },

    #[error("unauthorized url: {context} -> {location}")]
    Unauthorized { context: String, location: String },

    #[error("fetching disallowed for '{location}'")]
    Disallowed { location: String },

    #[error("can't follow redirect to https because https is not supported: '{location}'")]
    UnsupportedSecureTransport { location: String },

    #[error("invalid mapped url: '{location}'")]
    OriginMappingFailure { location: String },

    #[error("redirect response for {url} did not complete")]
    FetchFailed { url: String },
}

/// Fieldless mirror of [`RedirectError`] for matching and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedirectErrorKind {
    MalformedUrl,
    UncacheableRedirect,
    MissingOrEmptyLocation,
    FragmentUnsupported,
    TooManyRedirects,
    CyclicRedirect,
    Unauthorized,
    Disallowed,
    UnsupportedSecureTransport,
    OriginMappingFailure,
    FetchFailed,
}

impl RedirectError {
    pub fn kind(&self) -> RedirectErrorKind {
        match self {
            RedirectError::MalformedUrl { .. } => RedirectErrorKind::MalformedUrl,
            RedirectError::UncacheableRedirect { .. } => RedirectErrorKind::UncacheableRedirect,
            RedirectError::MissingOrEmptyLocation { .. } => {
                RedirectErrorKind::MissingOrEmptyLocation
            }
            RedirectError::FragmentUnsupported { .. } => RedirectErrorKind::FragmentUnsupported,
            RedirectError::TooManyRedirects { .. } => RedirectErrorKind::TooManyRedirects,
            RedirectError::CyclicRedirect { .. } => RedirectErrorKind::CyclicRedirect,
            RedirectError::Unauthorized { .. } => RedirectErrorKind::Unauthorized,
            RedirectError::Disallowed { .. } => RedirectErrorKind::Disallowed,
            RedirectError::UnsupportedSecureTransport { .. } => {
                RedirectErrorKind::UnsupportedSecureTransport
            }
            RedirectError::OriginMappingFailure { .. } => RedirectErrorKind::OriginMappingFailure,
            RedirectError::FetchFailed { .. } => RedirectErrorKind::FetchFailed,
        }
    }

    /// Logs the failure. Origin mapping should never fail for a URL that
    /// already passed authorization, so it is reported as an error.
    pub(crate) fn log(&self) {
        match self {
            RedirectError::OriginMappingFailure { location } => {
                tracing::error!(url = %location, kind = ?self.kind(), "{}", self);
            }
            _ => tracing::warn!(kind = ?self.kind(), "{}", self),
        }
    }
}

/// Invalid construction parameters for a `RedirectFollowingFetcher`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("redirect fetcher requires a transport")]
    MissingTransport,
    #[error("redirect fetcher requires a destination policy")]
    MissingPolicy,
    #[error("redirect fetcher requires a context url")]
    MissingContextUrl,
    #[error("redirect fetcher requires a maximum redirect count")]
    MissingMaxRedirects,
    #[error("invalid context url '{0}'")]
    InvalidContextUrl(String),
}
