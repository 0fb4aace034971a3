use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::inventory::engine::IngredientUse;

/// Body for POST /meals. Defaults mirror a plain home-cooked manual log.
#[derive(Debug, Deserialize)]
pub struct LogMealRequest {
    pub name: String,
    #[serde(default)]
    pub ingredients_used: Vec<IngredientUse>,
    #[serde(default = "default_confidence")]
    pub confidence: i32,
    #[serde(default = "default_meal_type")]
    pub meal_type: String,
    pub calories: Option<i32>,
    pub protein_g: Option<i32>,
    pub carbs_g: Option<i32>,
    pub fat_g: Option<i32>,
    /// false when dining out: the meal is still logged, stock stays untouched.
    #[serde(default = "default_true")]
    pub deduct_stock: bool,
    /// manual | imported | predicted | dining_out
    #[serde(default = "default_source")]
    pub source: String,
    pub kitchen_id: Option<Uuid>,
}

fn default_confidence() -> i32 {
    100
}
fn default_meal_type() -> String {
    "other".to_string()
}
fn default_true() -> bool {
    true
}
fn default_source() -> String {
    "manual".to_string()
}

#[derive(Debug, Serialize)]
pub struct LogMealResponse {
    pub message: String,
    pub meal_id: Uuid,
    /// One human-readable line per ingredient, in input order. Partial
    /// failures show up here, not as an error status.
    pub deduction_report: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_meal_request_fills_defaults() {
        let req: LogMealRequest = serde_json::from_str(
            r#"{"name":"Tomato Pasta","ingredients_used":[{"item":"Tomato","qty":"200g"}]}"#,
        )
        .unwrap();
        assert_eq!(req.confidence, 100);
        assert_eq!(req.meal_type, "other");
        assert_eq!(req.source, "manual");
        assert!(req.deduct_stock);
        assert!(req.kitchen_id.is_none());
        assert_eq!(req.ingredients_used.len(), 1);
    }

    #[test]
    fn log_meal_request_accepts_dining_out() {
        let req: LogMealRequest = serde_json::from_str(
            r#"{"name":"Pizza","deduct_stock":false,"source":"dining_out"}"#,
        )
        .unwrap();
        assert!(!req.deduct_stock);
        assert_eq!(req.source, "dining_out");
        assert!(req.ingredients_used.is_empty());
    }
}
