use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateKitchenRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinKitchenRequest {
    pub invite_code: String,
}

#[derive(Debug, Serialize)]
pub struct KitchenResponse {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub invite_code: String,
}
