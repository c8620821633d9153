use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Redirect-following parameters (`[redirect]` in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectConfig {
    /// Maximum number of redirects followed for one fetch.
    pub max_redirects: usize,
    /// Page on whose behalf fetches are made; redirect targets must be
    /// authorized relative to it. Defaults to the URL being fetched.
    #[serde(default)]
    pub context_url: Option<String>,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            max_redirects: 10,
            context_url: None,
        }
    }
}

/// Transport parameters (`[transport]` in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    pub connect_timeout_secs: u64,
    /// Total time allowed for one hop.
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

/// One origin rewrite: requests for hosts matching `from` go to `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginMapConfig {
    /// Host wildcard, e.g. `cdn.example.com` or `*.example.com`.
    pub from: String,
    /// Origin to fetch from instead, e.g. `http://10.0.0.5:8080`.
    pub to: String,
    /// Host header to send; defaults to the logical host.
    #[serde(default)]
    pub host_header: Option<String>,
}

/// Destination policy (`[policy]` in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Host wildcards redirects may lead to, besides the context URL's host.
    #[serde(default)]
    pub authorized_domains: Vec<String>,
    /// URL wildcards; when non-empty, a URL must match one to be fetched.
    #[serde(default)]
    pub allow: Vec<String>,
    /// URL wildcards that are never fetched.
    #[serde(default)]
    pub disallow: Vec<String>,
    #[serde(default)]
    pub origin_maps: Vec<OriginMapConfig>,
    /// Like `origin_maps`, but the target is a proxy and the Host header is left alone.
    #[serde(default)]
    pub proxy_maps: Vec<OriginMapConfig>,
    /// Treat `Vary` on fields other than Accept-Encoding/Cookie as uncacheable.
    #[serde(default = "default_true")]
    pub respect_vary: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            authorized_domains: Vec::new(),
            allow: Vec::new(),
            disallow: Vec::new(),
            origin_maps: Vec::new(),
            proxy_maps: Vec::new(),
            respect_vary: true,
        }
    }
}

/// Global configuration loaded from `~/.config/rfetch/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfetchConfig {
    #[serde(default)]
    pub redirect: RedirectConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl RfetchConfig {
    /// Pretty TOML, as written to a freshly created config file.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RfetchConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

/// Like [`load_or_init`] but for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<RfetchConfig> {
    if !path.exists() {
        let default_cfg = RfetchConfig::default();
        let toml = default_cfg.to_toml()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: RfetchConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = RfetchConfig::default();
        assert_eq!(cfg.redirect.max_redirects, 10);
        assert!(cfg.redirect.context_url.is_none());
        assert_eq!(cfg.transport.connect_timeout_secs, 15);
        assert_eq!(cfg.transport.timeout_secs, 30);
        assert!(cfg.policy.authorized_domains.is_empty());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = RfetchConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: RfetchConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: RfetchConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.redirect.max_redirects, 10);
        assert!(cfg.policy.respect_vary);
        assert!(cfg.transport.user_agent.is_none());
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            [redirect]
            max_redirects = 3
            context_url = "http://www.example.com/"

            [transport]
            connect_timeout_secs = 5
            timeout_secs = 10
            user_agent = "rfetch-test"

            [policy]
            authorized_domains = ["*.example.com"]
            disallow = ["*/private/*"]

            [[policy.origin_maps]]
            from = "cdn.example.com"
            to = "http://10.0.0.5:8080"
        "#;
        let cfg: RfetchConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.redirect.max_redirects, 3);
        assert_eq!(
            cfg.redirect.context_url.as_deref(),
            Some("http://www.example.com/")
        );
        assert_eq!(cfg.transport.user_agent.as_deref(), Some("rfetch-test"));
        assert_eq!(cfg.policy.authorized_domains, vec!["*.example.com"]);
        assert!(cfg.policy.respect_vary);
        assert_eq!(cfg.policy.origin_maps.len(), 1);
        assert_eq!(cfg.policy.origin_maps[0].to, "http://10.0.0.5:8080");
        assert!(cfg.policy.origin_maps[0].host_header.is_none());
    }

    #[test]
    fn negative_max_redirects_is_rejected() {
        let toml = "[redirect]\nmax_redirects = -1\n";
        assert!(toml::from_str::<RfetchConfig>(toml).is_err());
    }

    #[test]
    fn load_or_init_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = load_or_init_at(&path).unwrap();
        assert_eq!(cfg, RfetchConfig::default());
        assert!(path.exists());
        let again = load_or_init_at(&path).unwrap();
        assert_eq!(again, cfg);
    }
}
