//! Session history pagination
//!
//! The session endpoint is paged by offset. Pages are requested strictly in
//! sequence and concatenated in request order. Sessions are not
//! deduplicated, so a record that moves between pages while we read will
//! appear twice.

use async_trait::async_trait;
use chargeboard_core::error::Result;
use indicatif::ProgressBar;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Number of sessions requested per page
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Anything that can serve pages of raw session records
#[async_trait]
pub trait SessionPageSource: Send + Sync {
    /// Fetch `page_size` records starting at `offset`
    async fn fetch_page(&self, offset: usize, page_size: usize) -> Result<Vec<Value>>;

    /// Fetch the complete list in one unpaginated request
    async fn fetch_all(&self) -> Result<Vec<Value>>;
}

/// Read pages until one comes back short or empty
///
/// A failed request ends pagination; whatever was read before it is kept.
pub async fn paginate<S>(source: &S, page_size: usize, progress: Option<&ProgressBar>) -> Vec<Value>
where
    S: SessionPageSource + ?Sized,
{
    let page_size = page_size.max(1);
    let mut sessions = Vec::new();
    let mut offset = 0usize;

    loop {
        let page = match source.fetch_page(offset, page_size).await {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    "Session page at offset {} failed ({}); stopping pagination",
                    offset, e
                );
                break;
            }
        };

        if page.is_empty() {
            debug!("Session page at offset {} is empty", offset);
            break;
        }

        let received = page.len();
        debug!("Session page at offset {}: {} sessions", offset, received);
        sessions.extend(page);

        if let Some(pb) = progress {
            pb.set_position(sessions.len() as u64);
        }

        if received < page_size {
            break;
        }
        offset += page_size;
    }

    sessions
}

/// Assemble the session payload
///
/// Paginates first. When that yields nothing, falls back to one unpaginated
/// request. Returns `None` when the fallback fails too.
pub async fn collect_sessions<S>(
    source: &S,
    page_size: usize,
    progress: Option<&ProgressBar>,
) -> Option<Vec<Value>>
where
    S: SessionPageSource + ?Sized,
{
    let sessions = paginate(source, page_size, progress).await;
    if !sessions.is_empty() {
        info!("Collected {} sessions by pagination", sessions.len());
        return Some(sessions);
    }

    match source.fetch_all().await {
        Ok(sessions) => {
            info!("Collected {} sessions from unpaginated request", sessions.len());
            Some(sessions)
        }
        Err(e) => {
            warn!("Unpaginated session request failed ({}); skipping session history", e);
            None
        }
    }
}
