use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Merged user + profile view returned by GET /profile.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub dietary_preferences: Option<String>,
    pub allergies: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    pub age: Option<i32>,
    pub activity_level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub dietary_preferences: Option<String>,
    pub allergies: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    pub age: Option<i32>,
    pub activity_level: Option<String>,
}
