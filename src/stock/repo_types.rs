use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// One tracked ingredient, owned by a user or a shared kitchen.
///
/// `quantity` is the display string the quantity parser round-trips through
/// ("500 g", "2 pcs"); it is only interpreted during reconciliation.
/// `source` records provenance: manual | bill | screenshot | manual_chat.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StockRecord {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub kitchen_id: Option<Uuid>,
    pub item_name: String,
    pub quantity: String,
    pub category: String,
    pub expiry_date: Option<Date>,
    pub source: String,
    pub updated_at: OffsetDateTime,
}
