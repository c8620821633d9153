//! CLI for rfetch.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rfetch_core::config;
use std::path::PathBuf;

use commands::{run_config, run_get, GetArgs};

/// Top-level CLI for rfetch.
#[derive(Debug, Parser)]
#[command(name = "rfetch")]
#[command(about = "rfetch: HTTP fetcher that follows validated, cache-aware redirects", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch a URL, following permitted redirects, and write the final body.
    Get {
        /// HTTP/HTTPS URL to fetch.
        url: String,

        /// Write the body to FILE instead of stdout.
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,

        /// Override the configured redirect limit.
        #[arg(long, value_name = "N")]
        max_redirects: Option<usize>,

        /// Page the fetch is made on behalf of (defaults to config, then URL).
        #[arg(long, value_name = "URL")]
        context_url: Option<String>,

        /// Additional authorized domain pattern (repeatable, `*`/`?` wildcards).
        #[arg(long = "authorize", value_name = "PATTERN")]
        authorize: Vec<String>,

        /// Extra request header as NAME:VALUE (repeatable).
        #[arg(long = "header", short = 'H', value_name = "NAME:VALUE")]
        headers: Vec<String>,

        /// Print a JSON summary of the outcome to stderr.
        #[arg(long)]
        json: bool,
    },

    /// Show the config file path and effective configuration.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get {
                url,
                output,
                max_redirects,
                context_url,
                authorize,
                headers,
                json,
            } => {
                let args = GetArgs {
                    url,
                    output,
                    max_redirects,
                    context_url,
                    authorize,
                    headers,
                    json,
                };
                run_get(&cfg, args).await?;
            }
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
