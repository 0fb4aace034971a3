use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::stock::repo_types::StockRecord;

/// Body for POST /stock and the elements of POST /stock/batch.
#[derive(Debug, Deserialize)]
pub struct AddStockRequest {
    pub item_name: String,
    /// Free-form quantity string; defaults to "1 unit" when absent.
    pub quantity: Option<String>,
    pub category: Option<String>,
    pub expiry_date: Option<Date>,
    /// Target a shared kitchen instead of the caller's personal stock.
    pub kitchen_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct AddStockResponse {
    /// The engine's one-line confirmation, verbatim.
    pub message: String,
    /// The row that was created or merged into, when it could be refetched.
    pub item: Option<StockRecord>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStockRequest {
    pub item_name: Option<String>,
    pub quantity: Option<String>,
    pub category: Option<String>,
    pub expiry_date: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub struct StockQuery {
    pub kitchen_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_request_tolerates_missing_optionals() {
        let req: AddStockRequest = serde_json::from_str(r#"{"item_name":"Rice"}"#).unwrap();
        assert_eq!(req.item_name, "Rice");
        assert!(req.quantity.is_none());
        assert!(req.kitchen_id.is_none());
    }

    #[test]
    fn add_request_parses_expiry_date() {
        let req: AddStockRequest =
            serde_json::from_str(r#"{"item_name":"Milk","quantity":"1 l","expiry_date":"2026-09-01"}"#)
                .unwrap();
        assert!(req.expiry_date.is_some());
    }
}
