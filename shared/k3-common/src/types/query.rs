//! Bill Query Types

use serde::{Deserialize, Serialize};

/// Service stub behind every `ExecuteBillQuery` call.
pub const EXECUTE_BILL_QUERY: &str =
    "Kingdee.BOS.WebApi.ServicesStub.DynamicFormService.ExecuteBillQuery";

/// Form holding stock on hand.
pub const INVENTORY_FORM_ID: &str = "STK_Inventory";

/// Columns requested from the inventory form, in row order.
pub const INVENTORY_FIELD_KEYS: &str =
    "FmaterialID.Fnumber,FmaterialID.FName,FStockID.Fnumber,FStockID.Fname,fbaseqty";

/// Full URL of a web API service under `server_url`.
pub fn service_url(server_url: &str, service: &str) -> String {
    format!("{}/{service}.common.kdsvc", server_url.trim_end_matches('/'))
}

/// Parameters of an `ExecuteBillQuery` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BillQuery {
    pub form_id: String,
    pub field_keys: String,
    pub filter_string: String,
    pub order_string: String,
    pub top_row_count: u32,
    pub start_row: u32,
    pub limit: u32,
    pub sub_system_id: String,
}

impl BillQuery {
    /// Stock on hand in one warehouse.
    pub fn inventory(warehouse_code: &str, limit: u32) -> Self {
        Self {
            form_id: INVENTORY_FORM_ID.to_string(),
            field_keys: INVENTORY_FIELD_KEYS.to_string(),
            filter_string: format!("FStockID.Fnumber='{warehouse_code}'"),
            order_string: String::new(),
            top_row_count: 0,
            start_row: 0,
            limit,
            sub_system_id: String::new(),
        }
    }
}

/// Request body envelope: the query sits under `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillQueryRequest {
    pub data: BillQuery,
}

impl From<BillQuery> for BillQueryRequest {
    fn from(data: BillQuery) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_url_appends_suffix() {
        assert_eq!(
            service_url("http://erp.local/K3Cloud/", EXECUTE_BILL_QUERY),
            "http://erp.local/K3Cloud/Kingdee.BOS.WebApi.ServicesStub.DynamicFormService.ExecuteBillQuery.common.kdsvc"
        );
    }

    #[test]
    fn inventory_query_serializes_pascal_case() {
        let body = BillQueryRequest::from(BillQuery::inventory("CK0201", 2));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "data": {
                    "FormId": "STK_Inventory",
                    "FieldKeys": INVENTORY_FIELD_KEYS,
                    "FilterString": "FStockID.Fnumber='CK0201'",
                    "OrderString": "",
                    "TopRowCount": 0,
                    "StartRow": 0,
                    "Limit": 2,
                    "SubSystemId": ""
                }
            })
        );
    }
}
