//! Raw response loader
//!
//! Produces the pair of raw payloads for one run, either live from the API
//! (saving each to the cache) or from the latest cached files.

use crate::cache::{PayloadKind, RawCache};
use crate::client::{TeslaClient, Vehicle};
use crate::pagination::{DEFAULT_PAGE_SIZE, SessionPageSource, collect_sessions};
use async_trait::async_trait;
use chargeboard_core::error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{info, warn};

/// The raw payloads of one run; either may be absent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPayloads {
    pub aggregate: Option<Value>,
    pub sessions: Option<Value>,
}

impl RawPayloads {
    pub fn is_empty(&self) -> bool {
        self.aggregate.is_none() && self.sessions.is_none()
    }

    /// Load the latest cached payload of each kind
    pub async fn load_cached(cache: &RawCache) -> Result<Self> {
        Ok(Self {
            aggregate: cache.load_latest(PayloadKind::Aggregate).await?,
            sessions: cache.load_latest(PayloadKind::Sessions).await?,
        })
    }
}

/// Session pages of one vehicle
struct VehicleSessions<'a> {
    client: &'a TeslaClient,
    vin: &'a str,
}

#[async_trait]
impl SessionPageSource for VehicleSessions<'_> {
    async fn fetch_page(&self, offset: usize, page_size: usize) -> Result<Vec<Value>> {
        self.client
            .charging_history(self.vin, Some((offset, page_size)))
            .await
    }

    async fn fetch_all(&self) -> Result<Vec<Value>> {
        self.client.charging_history(self.vin, None).await
    }
}

/// Live loader for the first vehicle on the account
pub struct TeslaLoader {
    client: TeslaClient,
    cache: RawCache,
    page_size: usize,
    show_progress: bool,
}

impl TeslaLoader {
    pub fn new(client: TeslaClient, cache: RawCache) -> Self {
        Self {
            client,
            cache,
            page_size: DEFAULT_PAGE_SIZE,
            show_progress: false,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Show a spinner while session pages are read
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Fetch both payloads and cache them
    ///
    /// A failed daily-history request or an unrecoverable session history
    /// leaves that payload absent. Failing to list vehicles is an error.
    pub async fn fetch_live(&self) -> Result<RawPayloads> {
        let vehicle = self.client.first_vehicle().await?;
        info!(
            "Using vehicle {} ({})",
            vehicle.display_name.as_deref().unwrap_or("unnamed"),
            vehicle.vin
        );

        let aggregate = self.fetch_aggregate(&vehicle).await?;
        let sessions = self.fetch_sessions(&vehicle).await?;

        Ok(RawPayloads {
            aggregate,
            sessions,
        })
    }

    async fn fetch_aggregate(&self, vehicle: &Vehicle) -> Result<Option<Value>> {
        match self.client.charge_history(vehicle).await {
            Ok(payload) => {
                self.cache.save(PayloadKind::Aggregate, &payload).await?;
                Ok(Some(payload))
            }
            Err(e) => {
                warn!("Daily history request failed ({}); skipping", e);
                Ok(None)
            }
        }
    }

    async fn fetch_sessions(&self, vehicle: &Vehicle) -> Result<Option<Value>> {
        let source = VehicleSessions {
            client: &self.client,
            vin: &vehicle.vin,
        };

        let progress = self.show_progress.then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg} [{elapsed_precise}] {pos} sessions")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message("Fetching session history");
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            pb
        });

        let sessions = collect_sessions(&source, self.page_size, progress.as_ref()).await;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        match sessions {
            Some(list) => {
                let payload = Value::Array(list);
                self.cache.save(PayloadKind::Sessions, &payload).await?;
                Ok(Some(payload))
            }
            None => Ok(None),
        }
    }
}
