//! CLI command handlers, one per file.

mod config;
pub(super) mod get;

pub use config::run_config;
pub use get::{run_get, GetArgs};
