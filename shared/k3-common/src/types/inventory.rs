//! Inventory Types

use serde::{Deserialize, Serialize};

/// One stock line: a material held in a warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Material number.
    pub material_code: String,
    /// Material name.
    pub material_name: String,
    /// Warehouse number.
    pub warehouse_code: String,
    /// Warehouse name.
    pub warehouse_name: String,
    /// Base-unit quantity (kg).
    pub quantity: f64,
}

/// Warehouse category used to group stock on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarehouseGroup {
    /// Finished goods.
    Finished,
    /// Raw materials.
    RawMaterial,
    /// Semi-finished goods.
    SemiFinished,
    /// Workshop (line-side) stock.
    Workshop,
}

impl WarehouseGroup {
    /// Order in which groups are shown.
    pub const DISPLAY_ORDER: [Self; 4] = [
        Self::Finished,
        Self::RawMaterial,
        Self::SemiFinished,
        Self::Workshop,
    ];

    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Finished => "成品仓",
            Self::RawMaterial => "原材料仓",
            Self::SemiFinished => "半成品仓",
            Self::Workshop => "车间仓",
        }
    }

    /// Chart colour.
    pub const fn color(self) -> &'static str {
        match self {
            Self::Finished => "#3b82f6",
            Self::RawMaterial => "#f59e0b",
            Self::SemiFinished => "#06b6d4",
            Self::Workshop => "#10b981",
        }
    }
}

/// Stock total for one warehouse group, in tonnes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryMetric {
    pub label: String,
    pub value: f64,
    pub unit: String,
    pub color: String,
    pub total: f64,
}

/// Dashboard table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub id: String,
    pub name: String,
    pub code: String,
    pub warehouse: String,
    pub quantity: i64,
    pub available: i64,
}

/// Cached inventory and the time it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySnapshot {
    pub data: Vec<InventoryItem>,
    /// Unix time in milliseconds.
    pub updated_at: i64,
}
