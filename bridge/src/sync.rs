//! Inventory Sync
//!
//! Refreshes the snapshot file (and its mirrors) once, or on a fixed interval
//! until shutdown.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use k3_common::InventorySnapshot;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::cache::{write_snapshot, InventoryCache};
use crate::client::K3Client;
use crate::config::Config;
use crate::error::BridgeResult;
use crate::inventory::{query_all_warehouses, DEFAULT_WAREHOUSE_LIMIT};

/// Fetch all warehouses and write the snapshot. Returns the row count.
///
/// The primary file must be written; mirror failures are only logged.
pub async fn sync_once(client: &K3Client, config: &Config) -> BridgeResult<usize> {
    info!("Fetching K3 Cloud inventory");
    let data = query_all_warehouses(client, &config.warehouses, DEFAULT_WAREHOUSE_LIMIT).await;
    let snapshot = InventorySnapshot {
        data,
        updated_at: chrono::Utc::now().timestamp_millis(),
    };

    let cache = InventoryCache::from_config(config);
    cache.store(&snapshot).await?;
    info!(
        rows = snapshot.data.len(),
        path = %cache.path().display(),
        "Saved inventory snapshot"
    );

    for mirror in &config.cache_mirrors {
        match write_snapshot(mirror, &snapshot).await {
            Ok(()) => info!(path = %mirror.display(), "Mirrored inventory snapshot"),
            Err(e) => warn!(path = %mirror.display(), error = %e, "Skipping snapshot mirror"),
        }
    }

    Ok(snapshot.data.len())
}

/// Longest accepted gap between scheduled syncs (one year).
pub const MAX_SYNC_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Interval for `secs`, clamped to `1s..=MAX_SYNC_INTERVAL`.
pub fn sync_period(secs: u64) -> Duration {
    Duration::from_secs(secs).clamp(Duration::from_secs(1), MAX_SYNC_INTERVAL)
}

/// Sync now, then every `config.sync_interval_secs` until `shutdown` resolves.
///
/// The first sync must succeed; later failures are logged and the loop
/// carries on. Shutdown also interrupts a sync that is in flight.
pub async fn watch<F>(client: &K3Client, config: &Config, shutdown: F) -> BridgeResult<()>
where
    F: Future<Output = ()>,
{
    let period = sync_period(config.sync_interval_secs);
    if period.as_secs() != config.sync_interval_secs {
        warn!(
            requested_secs = config.sync_interval_secs,
            interval_secs = period.as_secs(),
            "Sync interval out of range, clamped"
        );
    }
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(shutdown);

    match until_shutdown(sync_once(client, config), shutdown.as_mut()).await {
        Some(result) => {
            result?;
        }
        None => {
            info!("Inventory sync stopped");
            return Ok(());
        }
    }

    info!(interval_secs = period.as_secs(), "Inventory sync scheduled");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match until_shutdown(sync_once(client, config), shutdown.as_mut()).await {
                    Some(Ok(_)) => {}
                    Some(Err(e)) => error!(error = %e, "Scheduled inventory sync failed"),
                    None => break,
                }
            }
            () = shutdown.as_mut() => break,
        }
    }

    info!("Inventory sync stopped");
    Ok(())
}

/// Run `work` unless `shutdown` resolves first.
async fn until_shutdown<T, F>(work: impl Future<Output = T>, shutdown: Pin<&mut F>) -> Option<T>
where
    F: Future<Output = ()>,
{
    tokio::select! {
        biased;
        result = work => Some(result),
        () = shutdown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_period_is_clamped() {
        assert_eq!(sync_period(0), Duration::from_secs(1));
        assert_eq!(sync_period(3600), Duration::from_secs(3600));
        assert_eq!(sync_period(u64::MAX), MAX_SYNC_INTERVAL);
        assert!(Instant::now().checked_add(sync_period(u64::MAX)).is_some());
    }
}
