//! Dashboard shaping: per-group tonnage and table rows.

use k3_common::{InventoryItem, InventoryMetric, InventoryRow, WarehouseGroup};

use super::WarehouseConfig;

const KG_PER_TONNE: f64 = 1000.0;
const TONNE_UNIT: &str = "吨";

/// Total stock per warehouse group, in tonnes rounded to two decimals.
pub fn calculate_metrics(
    inventory: &[InventoryItem],
    warehouses: &WarehouseConfig,
) -> Vec<InventoryMetric> {
    WarehouseGroup::DISPLAY_ORDER
        .iter()
        .map(|&group| {
            let codes = warehouses.codes(group);
            let total_kg: f64 = inventory
                .iter()
                .filter(|item| codes.iter().any(|c| *c == item.warehouse_code))
                .map(|item| item.quantity)
                .sum();
            let tonnes = round2(total_kg / KG_PER_TONNE);
            InventoryMetric {
                label: group.label().to_string(),
                value: tonnes,
                unit: TONNE_UNIT.to_string(),
                color: group.color().to_string(),
                total: tonnes,
            }
        })
        .collect()
}

/// Table rows for the dashboard.
///
/// Only positive stock is listed, unless nothing is positive, in which case
/// every item is.
pub fn dashboard_rows(inventory: &[InventoryItem]) -> Vec<InventoryRow> {
    let positive: Vec<&InventoryItem> = inventory.iter().filter(|i| i.quantity > 0.0).collect();
    let source: Vec<&InventoryItem> = if positive.is_empty() {
        inventory.iter().collect()
    } else {
        positive
    };

    source
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let quantity = round_half_up(item.quantity);
            let id = if item.material_code.is_empty() {
                format!("inv-{index}")
            } else {
                format!("{}-{index}", item.material_code)
            };
            InventoryRow {
                id,
                name: item.material_name.clone(),
                code: item.material_code.clone(),
                warehouse: item.warehouse_name.clone(),
                quantity,
                available: quantity,
            }
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round() / 100.0
    } else {
        0.0
    }
}

fn round_half_up(value: f64) -> i64 {
    if value.is_finite() {
        (value + 0.5).floor() as i64
    } else {
        0
    }
}
