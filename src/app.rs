//! Run orchestration: load payloads, normalize, compose, write

use crate::cli::Cli;
use crate::output::{payload_preview, preview_heading, summary_table};
use chargeboard_core::error::{ChargeboardError, Result};
use chargeboard_core::normalize::{build_charge_sessions, build_daily_aggregates};
use chargeboard_core::timezone::TimezoneConfig;
use chargeboard_core::types::{ChargeSession, DailyAggregate};
use chargeboard_provider_tesla::{RawCache, RawPayloads, TeslaClient, TeslaLoader};
use chargeboard_report::{Card, ChartRenderer, ReportComposer, SvgRenderer, summary_cards};
use chrono_tz::Tz;
use std::path::Path;
use tracing::info;

/// Characters of each raw payload printed by `--discover`
pub const DISCOVER_PREVIEW_CHARS: usize = 5000;

/// A composed dashboard and the tables behind it
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub html: String,
    pub rows: Vec<DailyAggregate>,
    pub sessions: Vec<ChargeSession>,
    pub cards: Vec<Card>,
}

/// Normalize the payloads and compose the document
///
/// An absent payload contributes an empty table.
pub fn build_dashboard<R: ChartRenderer>(
    payloads: &RawPayloads,
    renderer: R,
    tz: Tz,
) -> Result<Dashboard> {
    let rows = payloads
        .aggregate
        .as_ref()
        .map(build_daily_aggregates)
        .unwrap_or_default();
    let sessions = payloads
        .sessions
        .as_ref()
        .map(build_charge_sessions)
        .unwrap_or_default();

    let html = ReportComposer::new(renderer, tz).compose(&rows, &sessions)?;
    let cards = summary_cards(&rows, &sessions);

    Ok(Dashboard {
        html,
        rows,
        sessions,
        cards,
    })
}

/// Write the document, creating parent directories as needed
pub async fn write_dashboard(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, html).await?;
    Ok(())
}

/// Latest cached payloads, failing when there are none
pub async fn load_offline(cache: &RawCache) -> Result<RawPayloads> {
    let payloads = RawPayloads::load_cached(cache).await?;
    if payloads.is_empty() {
        return Err(ChargeboardError::Config(format!(
            "No cached data found in {}. Run online first.",
            cache.dir().display()
        )));
    }
    Ok(payloads)
}

/// Run the command line
pub async fn run(cli: Cli) -> Result<()> {
    let tz_config = TimezoneConfig::from_cli(cli.timezone.as_deref(), cli.utc)?;
    info!("Using timezone: {}", tz_config.display_name());

    let cache = RawCache::new(cli.data_dir()?);
    info!("Raw payload cache: {}", cache.dir().display());

    let payloads = if cli.offline {
        info!("Offline mode, loading cached payloads");
        load_offline(&cache).await?
    } else {
        let client = TeslaClient::new(cli.require_token()?)?;
        let show_progress = is_terminal::is_terminal(std::io::stdout());
        TeslaLoader::new(client, cache)
            .with_page_size(cli.page_size)
            .with_progress(show_progress)
            .fetch_live()
            .await?
    };

    if cli.discover {
        for (name, payload) in [
            ("V1 charge_history", payloads.aggregate.as_ref()),
            ("V2 charge_history_v2", payloads.sessions.as_ref()),
        ] {
            println!("\n{}", preview_heading(name));
            println!("{}", payload_preview(payload, DISCOVER_PREVIEW_CHARS));
        }
        return Ok(());
    }

    let dashboard = build_dashboard(&payloads, SvgRenderer::default(), tz_config.tz)?;
    println!("V1: {} daily records", dashboard.rows.len());
    println!("V2: {} Supercharger sessions", dashboard.sessions.len());

    let output = cli.output_path()?;
    write_dashboard(&output, &dashboard.html).await?;

    if !dashboard.cards.is_empty() {
        summary_table(&dashboard.cards).printstd();
    }
    println!("Dashboard → {}", output.display());
    Ok(())
}
