use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// A shared kitchen (group) whose members pool their stock.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Kitchen {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub invite_code: String,
    pub created_at: OffsetDateTime,
}

/// Membership link; role is "admin" or "member".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct KitchenMember {
    pub id: Uuid,
    pub kitchen_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub joined_at: OffsetDateTime,
}

/// Join of kitchen and membership for the listing endpoint.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct KitchenMembership {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub invite_code: String,
}
