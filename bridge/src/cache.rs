//! Inventory Snapshot Cache
//!
//! Keeps the last all-warehouse fetch in a JSON file so repeated reads within
//! the TTL do not hit K3 Cloud.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use k3_common::{InventoryItem, InventorySnapshot};
use tracing::{debug, info, warn};

use crate::client::K3Client;
use crate::config::Config;
use crate::error::BridgeResult;
use crate::inventory::{query_all_warehouses, WarehouseConfig, DEFAULT_WAREHOUSE_LIMIT};

/// File-backed inventory cache.
#[derive(Debug, Clone)]
pub struct InventoryCache {
    path: PathBuf,
    ttl: Duration,
}

impl InventoryCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.cache_path.clone(),
            Duration::from_secs(config.cache_ttl_secs),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot file.
    ///
    /// A missing file is a silent miss; an unreadable or malformed one is
    /// logged and treated as a miss.
    pub async fn load(&self) -> Option<InventorySnapshot> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read inventory cache, ignoring it");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Malformed inventory cache, ignoring it");
                None
            }
        }
    }

    /// Whether `snapshot` is younger than the TTL at `now_ms` (Unix millis).
    pub fn is_fresh(&self, snapshot: &InventorySnapshot, now_ms: i64) -> bool {
        if snapshot.updated_at <= 0 {
            return false;
        }
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_sub(snapshot.updated_at) < ttl_ms
    }

    /// Write the snapshot, creating the parent directory if needed.
    pub async fn store(&self, snapshot: &InventorySnapshot) -> BridgeResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        write_snapshot(&self.path, snapshot).await
    }

    /// Inventory for all warehouses, from cache when fresh.
    ///
    /// With `force_refresh` the cache is bypassed. A fresh fetch is written
    /// back; a failed write is logged and the fetched data still returned.
    pub async fn get_inventory(
        &self,
        client: &K3Client,
        warehouses: &WarehouseConfig,
        force_refresh: bool,
    ) -> Vec<InventoryItem> {
        let now_ms = chrono::Utc::now().timestamp_millis();

        if !force_refresh {
            if let Some(snapshot) = self.load().await {
                if self.is_fresh(&snapshot, now_ms) {
                    debug!(rows = snapshot.data.len(), "Serving inventory from cache");
                    return snapshot.data;
                }
                debug!(updated_at = snapshot.updated_at, "Inventory cache is stale");
            }
        }

        let data = query_all_warehouses(client, warehouses, DEFAULT_WAREHOUSE_LIMIT).await;
        let snapshot = InventorySnapshot {
            data,
            updated_at: chrono::Utc::now().timestamp_millis(),
        };

        match self.store(&snapshot).await {
            Ok(()) => info!(
                rows = snapshot.data.len(),
                path = %self.path.display(),
                "Inventory cache refreshed"
            ),
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to write inventory cache"),
        }

        snapshot.data
    }
}

/// Write a snapshot as pretty-printed JSON.
pub async fn write_snapshot(path: &Path, snapshot: &InventorySnapshot) -> BridgeResult<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
