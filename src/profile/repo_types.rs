use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Extended profile data, one row per user, created lazily on first update.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub age: Option<i32>,
    pub activity_level: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    pub dietary_type: String,
    pub allergies: Option<String>,
    pub updated_at: OffsetDateTime,
}
