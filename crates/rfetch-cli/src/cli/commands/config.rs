//! `rfetch config` – show where the config lives and what it contains.

use anyhow::Result;
use rfetch_core::config::{self, RfetchConfig};

pub fn run_config(cfg: &RfetchConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", cfg.to_toml()?);
    Ok(())
}
