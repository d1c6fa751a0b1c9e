//! Integration tests for multi-warehouse inventory, the snapshot cache and sync.

mod helpers;

use std::path::PathBuf;
use std::time::Duration;

use axum::http::StatusCode;
use helpers::{row, rows_body, spawn_gateway, spawn_silent_gateway, warehouse_of, FakeGateway};
use k3_bridge::cache::InventoryCache;
use k3_bridge::config::Config;
use k3_bridge::inventory::{query_all_warehouses, WarehouseConfig};
use k3_bridge::{sync, K3Client};
use k3_common::InventorySnapshot;

/// Gateway that returns one row per warehouse and fails for `CK0202`.
async fn warehouse_gateway() -> FakeGateway {
    spawn_gateway(|body| {
        let warehouse = warehouse_of(body);
        if warehouse == "CK0202" {
            return (StatusCode::INTERNAL_SERVER_ERROR, "boom".into());
        }
        rows_body(vec![row(&format!("M-{warehouse}"), &warehouse, 1000.0)])
    })
    .await
}

fn config_with_cache(gateway: &FakeGateway, dir: &tempfile::TempDir) -> Config {
    Config {
        cache_path: dir.path().join("public/inventory-cache.json"),
        ..gateway.config()
    }
}

#[tokio::test]
async fn query_all_skips_failed_warehouses_and_keeps_order() {
    let gateway = warehouse_gateway().await;
    let client = K3Client::new(&gateway.config()).unwrap();

    let items = query_all_warehouses(&client, &WarehouseConfig::default(), 100).await;
    let codes: Vec<&str> = items.iter().map(|i| i.warehouse_code.as_str()).collect();
    assert_eq!(
        codes,
        ["CK0102", "CK1001", "CK0103", "CK0203", "CK0301", "CK0104", "104", "CK0201"]
    );

    assert_eq!(gateway.hits(), 9);
    assert!(gateway
        .requests()
        .iter()
        .all(|r| r.body["data"]["Limit"] == 100));
}

#[tokio::test]
async fn cache_serves_fresh_snapshot_without_calling_gateway() {
    let gateway = warehouse_gateway().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_cache(&gateway, &dir);
    let client = K3Client::new(&config).unwrap();
    let cache = InventoryCache::from_config(&config);

    let first = cache.get_inventory(&client, &config.warehouses, false).await;
    assert_eq!(first.len(), 8);
    assert_eq!(gateway.hits(), 9);
    assert!(config.cache_path.exists());

    let second = cache.get_inventory(&client, &config.warehouses, false).await;
    assert_eq!(second, first);
    assert_eq!(gateway.hits(), 9);

    let forced = cache.get_inventory(&client, &config.warehouses, true).await;
    assert_eq!(forced.len(), 8);
    assert_eq!(gateway.hits(), 18);
}

#[tokio::test]
async fn stale_snapshot_is_refetched() {
    let gateway = warehouse_gateway().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_cache(&gateway, &dir);
    let client = K3Client::new(&config).unwrap();

    let cache = InventoryCache::new(config.cache_path.clone(), Duration::from_secs(60));
    let stale = InventorySnapshot {
        data: Vec::new(),
        updated_at: chrono::Utc::now().timestamp_millis() - 120_000,
    };
    cache.store(&stale).await.unwrap();

    let items = cache.get_inventory(&client, &config.warehouses, false).await;
    assert_eq!(items.len(), 8);
    assert_eq!(gateway.hits(), 9);

    let stored = cache.load().await.unwrap();
    assert_eq!(stored.data, items);
    assert!(cache.is_fresh(&stored, chrono::Utc::now().timestamp_millis()));
}

#[tokio::test]
async fn sync_once_writes_primary_and_mirrors() {
    let gateway = warehouse_gateway().await;
    let dir = tempfile::tempdir().unwrap();
    let mirror = dir.path().join("mirror.json");
    let config = Config {
        cache_mirrors: vec![mirror.clone(), PathBuf::from("/nonexistent-dir/k3/cache.json")],
        ..config_with_cache(&gateway, &dir)
    };
    let client = K3Client::new(&config).unwrap();

    let rows = sync::sync_once(&client, &config).await.unwrap();
    assert_eq!(rows, 8);

    let primary: InventorySnapshot =
        serde_json::from_str(&std::fs::read_to_string(&config.cache_path).unwrap()).unwrap();
    let mirrored: InventorySnapshot =
        serde_json::from_str(&std::fs::read_to_string(&mirror).unwrap()).unwrap();
    assert_eq!(primary, mirrored);
    assert_eq!(primary.data.len(), 8);
}

#[tokio::test]
async fn watch_syncs_on_interval_until_shutdown() {
    let gateway = warehouse_gateway().await;
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        sync_interval_secs: 1,
        ..config_with_cache(&gateway, &dir)
    };
    let client = K3Client::new(&config).unwrap();

    // Stop once the first scheduled sync has reached the gateway.
    let shutdown = async {
        while gateway.hits() < 18 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    let finished = tokio::time::timeout(
        Duration::from_secs(10),
        sync::watch(&client, &config, shutdown),
    )
    .await;
    assert!(matches!(finished, Ok(Ok(()))));
    assert!(gateway.hits() >= 18);
    assert!(config.cache_path.exists());
}

#[tokio::test]
async fn watch_stops_during_in_flight_sync() {
    let gateway = spawn_silent_gateway().await;
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        request_timeout_secs: 60,
        ..config_with_cache(&gateway, &dir)
    };
    let client = K3Client::new(&config).unwrap();

    let shutdown = async {
        while gateway.hits() == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    let finished = tokio::time::timeout(
        Duration::from_secs(5),
        sync::watch(&client, &config, shutdown),
    )
    .await;
    assert!(matches!(finished, Ok(Ok(()))));
    assert!(!config.cache_path.exists());
}

#[tokio::test]
async fn watch_accepts_oversized_interval() {
    let gateway = spawn_silent_gateway().await;
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        sync_interval_secs: u64::MAX,
        ..config_with_cache(&gateway, &dir)
    };
    let client = K3Client::new(&config).unwrap();

    sync::watch(&client, &config, async {}).await.unwrap();
    assert!(!config.cache_path.exists());
}
