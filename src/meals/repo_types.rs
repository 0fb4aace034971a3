use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// A consumption event, immutable once written by the engine.
///
/// `ingredients_used` keeps the `{item, qty}` pairs exactly as logged; they
/// are display data and are never parsed again.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MealLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kitchen_id: Option<Uuid>,
    pub name: String,
    pub ingredients_used: serde_json::Value,
    pub confidence: i32,
    pub meal_type: String,
    pub calories: Option<i32>,
    pub protein_g: Option<i32>,
    pub carbs_g: Option<i32>,
    pub fat_g: Option<i32>,
    pub source: String,
    pub created_at: OffsetDateTime,
}
