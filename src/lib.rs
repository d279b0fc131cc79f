//! chargeboard - Render a self-contained HTML dashboard of a vehicle's
//! charging history
//!
//! The binary fetches the daily history and the paginated session history
//! (or reuses the last cached payloads), normalizes both into canonical
//! tables and writes one HTML document with inline SVG charts.
//!
//! # Examples
//!
//! ```no_run
//! use chargeboard::app::build_dashboard;
//! use chargeboard_provider_tesla::{RawCache, RawPayloads};
//! use chargeboard_report::SvgRenderer;
//! use chrono_tz::Tz;
//!
//! #[tokio::main]
//! async fn main() -> chargeboard::Result<()> {
//!     let cache = RawCache::new(RawCache::default_dir()?);
//!     let payloads = RawPayloads::load_cached(&cache).await?;
//!
//!     let dashboard = build_dashboard(&payloads, SvgRenderer::default(), Tz::UTC)?;
//!     std::fs::write("dashboard.html", dashboard.html)?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod cli;
pub mod output;

// Re-export commonly used types
pub use chargeboard_core::error::{ChargeboardError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
