//! Configuration-driven [`RedirectPolicy`].

use thiserror::Error;
use url::Url;

use super::{host_and_port, OriginMapping, RedirectPolicy, WildcardPattern};
use crate::config::{OriginMapConfig, PolicyConfig};
use crate::http::VaryOption;
use crate::url_util;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("invalid wildcard pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid origin map target '{0}': expected an http(s) origin")]
    InvalidOriginTarget(String),
}

#[derive(Debug, Clone)]
struct OriginMap {
    from: WildcardPattern,
    to: Url,
    host_header: Option<String>,
    is_proxy: bool,
}

impl OriginMap {
    fn from_config(cfg: &OriginMapConfig, is_proxy: bool) -> Result<Self, PolicyError> {
        let to = url_util::parse_web_url(&cfg.to)
            .ok_or_else(|| PolicyError::InvalidOriginTarget(cfg.to.clone()))?;
        Ok(Self {
            from: compile(&cfg.from)?,
            to,
            host_header: cfg.host_header.clone(),
            is_proxy,
        })
    }

    fn apply(&self, url: &Url) -> Option<OriginMapping> {
        let mut mapped = url.clone();
        mapped.set_scheme(self.to.scheme()).ok()?;
        mapped.set_host(self.to.host_str()).ok()?;
        mapped.set_port(self.to.port()).ok()?;
        let host_header = self
            .host_header
            .clone()
            .unwrap_or_else(|| host_and_port(url));
        Some(OriginMapping {
            url: mapped,
            host_header,
            is_proxy: self.is_proxy,
        })
    }
}

/// Policy built from the `[policy]` config section.
///
/// - A candidate is authorized if its host equals the context host or
///   matches one of `authorized_domains`.
/// - A URL is allowed unless it matches `disallow`; if `allow` is non-empty
///   it must also match one of those.
/// - Origin maps are tried in order (`origin_maps` before `proxy_maps`);
///   unmapped URLs map to themselves.
#[derive(Debug, Clone)]
pub struct DomainPolicy {
    authorized: Vec<WildcardPattern>,
    allow: Vec<WildcardPattern>,
    disallow: Vec<WildcardPattern>,
    maps: Vec<OriginMap>,
    respect_vary: bool,
}

fn compile(pattern: &str) -> Result<WildcardPattern, PolicyError> {
    WildcardPattern::new(pattern).map_err(|source| PolicyError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn compile_all(patterns: &[String]) -> Result<Vec<WildcardPattern>, PolicyError> {
    patterns.iter().map(|p| compile(p)).collect()
}

impl DomainPolicy {
    pub fn from_config(cfg: &PolicyConfig) -> Result<Self, PolicyError> {
        let mut maps = Vec::with_capacity(cfg.origin_maps.len() + cfg.proxy_maps.len());
        for m in &cfg.origin_maps {
            maps.push(OriginMap::from_config(m, false)?);
        }
        for m in &cfg.proxy_maps {
            maps.push(OriginMap::from_config(m, true)?);
        }
        Ok(Self {
            authorized: compile_all(&cfg.authorized_domains)?,
            allow: compile_all(&cfg.allow)?,
            disallow: compile_all(&cfg.disallow)?,
            maps,
            respect_vary: cfg.respect_vary,
        })
    }

    /// Adds another authorized host wildcard (e.g. from a CLI flag).
    pub fn authorize(&mut self, pattern: &str) -> Result<(), PolicyError> {
        self.authorized.push(compile(pattern)?);
        Ok(())
    }
}

impl RedirectPolicy for DomainPolicy {
    fn is_domain_authorized(&self, context: &Url, candidate: &Url) -> bool {
        let Some(host) = candidate.host_str() else {
            return false;
        };
        if context
            .host_str()
            .is_some_and(|ctx| ctx.eq_ignore_ascii_case(host))
        {
            return true;
        }
        self.authorized.iter().any(|p| p.is_match(host))
    }

    fn is_allowed(&self, url: &str) -> bool {
        if self.disallow.iter().any(|p| p.is_match(url)) {
            return false;
        }
        self.allow.is_empty() || self.allow.iter().any(|p| p.is_match(url))
    }

    fn map_origin_url(&self, url: &Url) -> Option<OriginMapping> {
        if !url_util::is_web_url(url) {
            return None;
        }
        let host = url.host_str()?;
        match self.maps.iter().find(|m| m.from.is_match(host)) {
            Some(map) => map.apply(url),
            None => Some(OriginMapping {
                url: url.clone(),
                host_header: host_and_port(url),
                is_proxy: false,
            }),
        }
    }

    fn vary_option(&self) -> VaryOption {
        VaryOption::from_respect_vary(self.respect_vary)
    }
}
