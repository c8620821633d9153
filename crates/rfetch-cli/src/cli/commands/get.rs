//! `rfetch get` – fetch one URL through the redirect-following fetcher.

use anyhow::{anyhow, bail, Context, Result};
use rfetch_core::config::RfetchConfig;
use rfetch_core::http::RequestHeaders;
use rfetch_core::policy::DomainPolicy;
use rfetch_core::{CollectingFetch, CurlFetcher, FetchOutcome, RedirectFollowingFetcher};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct GetArgs {
    pub url: String,
    pub output: Option<PathBuf>,
    pub max_redirects: Option<usize>,
    pub context_url: Option<String>,
    pub authorize: Vec<String>,
    pub headers: Vec<String>,
    pub json: bool,
}

/// Parses `NAME:VALUE` into a trimmed pair.
pub(crate) fn parse_header_arg(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("header must be NAME:VALUE, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("header name is empty in {raw:?}");
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Applies command-line overrides and builds the fetcher stack.
pub(crate) fn build_fetcher(cfg: &RfetchConfig, args: &GetArgs) -> Result<RedirectFollowingFetcher> {
    let mut redirect = cfg.redirect.clone();
    if let Some(max) = args.max_redirects {
        redirect.max_redirects = max;
    }
    if let Some(ctx) = &args.context_url {
        redirect.context_url = Some(ctx.clone());
    }

    let mut policy = DomainPolicy::from_config(&cfg.policy)?;
    for pattern in &args.authorize {
        policy.authorize(pattern)?;
    }

    let transport = CurlFetcher::new(&cfg.transport);
    let fetcher =
        RedirectFollowingFetcher::from_config(&redirect, &args.url, Arc::new(transport), Arc::new(policy))?;
    Ok(fetcher)
}

fn summary(url: &str, outcome: &FetchOutcome) -> serde_json::Value {
    let headers: Vec<serde_json::Value> = outcome
        .headers
        .iter()
        .map(|(name, value)| serde_json::json!([name, value]))
        .collect();
    serde_json::json!({
        "url": url,
        "success": outcome.success,
        "status": outcome.status_code,
        "headers": headers,
        "body_bytes": outcome.body.len(),
    })
}

pub async fn run_get(cfg: &RfetchConfig, args: GetArgs) -> Result<()> {
    let fetcher = build_fetcher(cfg, &args)?;

    let mut request = RequestHeaders::new();
    for raw in &args.headers {
        let (name, value) = parse_header_arg(raw)?;
        request.add(&name, &value);
    }

    let (sink, rx) = CollectingFetch::new(request);
    tracing::info!(url = %args.url, "fetching");
    fetcher.fetch(&args.url, Box::new(sink));

    let outcome = tokio::task::spawn_blocking(move || rx.recv())
        .await
        .context("fetch task panicked")?
        .context("fetch finished without reporting an outcome")?;

    if args.json {
        eprintln!("{}", serde_json::to_string_pretty(&summary(&args.url, &outcome))?);
    }

    if !outcome.success {
        bail!(
            "fetch of {} failed (status {})",
            args.url,
            outcome.status_code
        );
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, &outcome.body)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = outcome.body.len(), "saved body");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&outcome.body)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
