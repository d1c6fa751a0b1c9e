//! Inventory
//!
//! Warehouse configuration, multi-warehouse queries and dashboard shaping.

pub mod dashboard;
pub mod rows;

use futures::future::join_all;
use k3_common::{InventoryItem, WarehouseGroup};
use tracing::{error, info};

use crate::client::K3Client;
use crate::config::{env_var, parse_list};

pub use dashboard::{calculate_metrics, dashboard_rows};

/// Row limit per warehouse when querying everything.
pub const DEFAULT_WAREHOUSE_LIMIT: u32 = 100;

/// Groups in the order their warehouses are queried and concatenated.
const FETCH_ORDER: [WarehouseGroup; 4] = [
    WarehouseGroup::RawMaterial,
    WarehouseGroup::Workshop,
    WarehouseGroup::SemiFinished,
    WarehouseGroup::Finished,
];

/// Warehouse codes for each dashboard group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseConfig {
    pub raw_material: Vec<String>,
    pub workshop: Vec<String>,
    pub semi_finished: Vec<String>,
    pub finished: Vec<String>,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        let codes = |list: &[&str]| -> Vec<String> { list.iter().map(|s| (*s).to_string()).collect() };
        Self {
            raw_material: codes(&["CK0102", "CK0202", "CK1001"]),
            workshop: codes(&["CK0103", "CK0203", "CK0301"]),
            semi_finished: codes(&["CK0104"]),
            finished: codes(&["104", "CK0201"]),
        }
    }
}

impl WarehouseConfig {
    /// Creates configuration from environment variables.
    ///
    /// Environment variables (comma-separated codes; unset or blank keeps the
    /// [`Default`] codes):
    /// - `K3_WAREHOUSES_RAW_MATERIAL`
    /// - `K3_WAREHOUSES_WORKSHOP`
    /// - `K3_WAREHOUSES_SEMI_FINISHED`
    /// - `K3_WAREHOUSES_FINISHED`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let read = |key: &str, fallback: Vec<String>| {
            env_var(key).map_or(fallback, |v| parse_list(&v))
        };
        Self {
            raw_material: read("K3_WAREHOUSES_RAW_MATERIAL", defaults.raw_material),
            workshop: read("K3_WAREHOUSES_WORKSHOP", defaults.workshop),
            semi_finished: read("K3_WAREHOUSES_SEMI_FINISHED", defaults.semi_finished),
            finished: read("K3_WAREHOUSES_FINISHED", defaults.finished),
        }
    }

    /// Codes belonging to `group`.
    pub fn codes(&self, group: WarehouseGroup) -> &[String] {
        match group {
            WarehouseGroup::RawMaterial => &self.raw_material,
            WarehouseGroup::Workshop => &self.workshop,
            WarehouseGroup::SemiFinished => &self.semi_finished,
            WarehouseGroup::Finished => &self.finished,
        }
    }

    /// Every configured code, in query order.
    pub fn all_codes(&self) -> Vec<&str> {
        FETCH_ORDER
            .iter()
            .flat_map(|&group| self.codes(group))
            .map(String::as_str)
            .collect()
    }
}

/// Query every configured warehouse concurrently.
///
/// A warehouse that fails is logged and contributes no rows; the others are
/// concatenated in configuration order.
pub async fn query_all_warehouses(
    client: &K3Client,
    warehouses: &WarehouseConfig,
    limit: u32,
) -> Vec<InventoryItem> {
    let codes = warehouses.all_codes();
    let results = join_all(codes.iter().map(|code| client.query_inventory(code, limit))).await;

    let mut items = Vec::new();
    let mut failed = 0usize;
    for (code, result) in codes.iter().zip(results) {
        match result {
            Ok(rows) => items.extend(rows),
            Err(e) => {
                failed += 1;
                error!(warehouse = %code, error = %e, "Failed to query warehouse inventory");
            }
        }
    }

    info!(
        warehouses = codes.len(),
        failed,
        rows = items.len(),
        "Queried all warehouses"
    );

    items
}
