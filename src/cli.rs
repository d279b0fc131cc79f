//! CLI interface for chargeboard
//!
//! # Example
//!
//! ```bash
//! # Fetch the latest history and render the dashboard
//! TESLA_ACCESS_TOKEN=... chargeboard
//!
//! # Re-render from the last cached payloads, bucketing sessions in UTC
//! chargeboard --offline --utc
//!
//! # Inspect the raw payload shapes without rendering
//! chargeboard --discover
//! ```

use chargeboard_core::error::{ChargeboardError, Result};
use chargeboard_provider_tesla::{DEFAULT_PAGE_SIZE, RawCache};
use clap::Parser;
use std::path::PathBuf;

/// Render a self-contained HTML dashboard of a vehicle's charging history
#[derive(Parser, Debug, Clone)]
#[command(name = "chargeboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Bearer token for the vendor APIs
    #[arg(long, env = "TESLA_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Render from the latest cached payloads without network access
    #[arg(long, conflicts_with = "discover")]
    pub offline: bool,

    /// Fetch and print the raw payloads, then exit without rendering
    #[arg(long)]
    pub discover: bool,

    /// Directory holding the raw payload cache
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path of the generated HTML file
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Timezone for session bucketing (e.g. "America/Los_Angeles", "UTC")
    /// If not specified, uses the system's local timezone
    #[arg(long, short = 'z')]
    pub timezone: Option<String>,

    /// Use UTC for session bucketing (overrides --timezone)
    #[arg(long)]
    pub utc: bool,

    /// Sessions requested per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = parse_page_size)]
    pub page_size: usize,

    /// Show informational output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    /// The token, required for any mode that talks to the network
    pub fn require_token(&self) -> Result<&str> {
        match self.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ChargeboardError::Config(
                "No access token. Pass --token or set TESLA_ACCESS_TOKEN, or use --offline".into(),
            )),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => RawCache::default_dir(),
        }
    }

    /// Output path, defaulting to `<data dir>/chargeboard/output/dashboard.html`
    pub fn output_path(&self) -> Result<PathBuf> {
        match &self.output {
            Some(path) => Ok(path.clone()),
            None => Ok(dirs::data_dir()
                .ok_or_else(|| ChargeboardError::Config("Cannot determine data directory".into()))?
                .join("chargeboard")
                .join("output")
                .join("dashboard.html")),
        }
    }
}

fn parse_page_size(raw: &str) -> std::result::Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("page size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
