//! Raw payload cache
//!
//! Each fetched payload is written as pretty JSON to
//! `<dir>/<prefix>_<YYYYMMDDTHHMMSSZ>.json`. Files are never rewritten or
//! pruned. The latest payload of a kind is the last file in lexicographic
//! order, which the timestamp format makes chronological.

use chargeboard_core::error::{ChargeboardError, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// The two raw payload kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Daily history from the owner API
    Aggregate,
    /// Session history from the ownership API
    Sessions,
}

impl PayloadKind {
    /// File name prefix of cached payloads
    pub fn prefix(&self) -> &'static str {
        match self {
            PayloadKind::Aggregate => "v1_charge_history",
            PayloadKind::Sessions => "v2_charge_history",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PayloadKind::Aggregate => "daily history",
            PayloadKind::Sessions => "session history",
        }
    }

    fn matches(&self, file_name: &str) -> bool {
        file_name
            .strip_prefix(self.prefix())
            .and_then(|rest| rest.strip_prefix('_'))
            .is_some_and(|rest| rest.ends_with(".json"))
    }
}

/// Directory of cached raw payloads
#[derive(Debug, Clone)]
pub struct RawCache {
    dir: PathBuf,
}

impl RawCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform data directory, e.g. `~/.local/share/chargeboard/data`
    pub fn default_dir() -> Result<PathBuf> {
        Ok(dirs::data_dir()
            .ok_or_else(|| ChargeboardError::Config("Cannot determine data directory".into()))?
            .join("chargeboard")
            .join("data"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a payload stamped with the current time
    pub async fn save(&self, kind: PayloadKind, payload: &Value) -> Result<PathBuf> {
        self.save_at(kind, payload, Utc::now()).await
    }

    /// Write a payload stamped with `at`
    pub async fn save_at(
        &self,
        kind: PayloadKind,
        payload: &Value,
        at: DateTime<Utc>,
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!(
            "{}_{}.json",
            kind.prefix(),
            at.format(TIMESTAMP_FORMAT)
        ));
        let content = serde_json::to_string_pretty(payload)?;
        tokio::fs::write(&path, content).await?;
        info!("Saved {} to {}", kind.label(), path.display());
        Ok(path)
    }

    /// Path of the most recent payload of a kind
    pub fn latest_path(&self, kind: PayloadKind) -> Option<PathBuf> {
        if !self.dir.exists() {
            debug!("Cache directory not found: {}", self.dir.display());
            return None;
        }

        let mut candidates: Vec<PathBuf> = walkdir::WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.file_name().to_str().is_some_and(|name| kind.matches(name)))
            .map(|e| e.into_path())
            .collect();

        candidates.sort();
        debug!(
            "Found {} cached {} files",
            candidates.len(),
            kind.label()
        );
        candidates.pop()
    }

    /// Load the most recent payload of a kind, if any was cached
    pub async fn load_latest(&self, kind: PayloadKind) -> Result<Option<Value>> {
        let Some(path) = self.latest_path(kind) else {
            return Ok(None);
        };
        let content = tokio::fs::read_to_string(&path).await?;
        let payload: Value = serde_json::from_str(&content)?;
        info!("Loaded cached {} from {}", kind.label(), path.display());
        Ok(Some(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::TempDir;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_save_file_name() {
        let temp = TempDir::new().unwrap();
        let cache = RawCache::new(temp.path().join("data"));

        let path = cache
            .save_at(PayloadKind::Sessions, &json!([]), at(9))
            .await
            .unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "v2_charge_history_20240601T090000Z.json"
        );
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_load_latest_picks_last_by_name() {
        let temp = TempDir::new().unwrap();
        let cache = RawCache::new(temp.path());

        cache
            .save_at(PayloadKind::Aggregate, &json!({ "run": 2 }), at(12))
            .await
            .unwrap();
        cache
            .save_at(PayloadKind::Aggregate, &json!({ "run": 1 }), at(8))
            .await
            .unwrap();
        cache
            .save_at(PayloadKind::Sessions, &json!({ "run": 3 }), at(23))
            .await
            .unwrap();

        let latest = cache.load_latest(PayloadKind::Aggregate).await.unwrap();
        assert_eq!(latest, Some(json!({ "run": 2 })));
    }

    #[tokio::test]
    async fn test_load_latest_ignores_other_files() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("v2_charge_history.json"), "[]").unwrap();
        std::fs::write(temp.path().join("v2_charge_history_x.txt"), "[]").unwrap();
        std::fs::write(temp.path().join("notes.json"), "{}").unwrap();

        let cache = RawCache::new(temp.path());
        assert!(cache.load_latest(PayloadKind::Sessions).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let cache = RawCache::new(temp.path().join("missing"));
        assert!(cache.load_latest(PayloadKind::Aggregate).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_latest_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("v1_charge_history_20240101T000000Z.json"),
            "{ not json",
        )
        .unwrap();

        let cache = RawCache::new(temp.path());
        let result = cache.load_latest(PayloadKind::Aggregate).await;
        assert!(matches!(result, Err(ChargeboardError::Json(_))));
    }
}
