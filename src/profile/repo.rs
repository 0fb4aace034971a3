use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::profile::repo_types::UserProfile;

const COLUMNS: &str = "id, user_id, display_name, age, activity_level, height_cm, weight_kg, \
                       dietary_type, allergies, updated_at";

pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<UserProfile>> {
    let profile = sqlx::query_as::<_, UserProfile>(&format!(
        "SELECT {COLUMNS} FROM user_profiles WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("find profile")?;
    Ok(profile)
}

pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub age: Option<i32>,
    pub activity_level: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    pub dietary_type: Option<String>,
    pub allergies: Option<String>,
}

/// Upsert the profile row; absent fields keep their stored values.
pub async fn upsert(db: &PgPool, user_id: Uuid, patch: &ProfilePatch) -> anyhow::Result<UserProfile> {
    let profile = sqlx::query_as::<_, UserProfile>(&format!(
        "INSERT INTO user_profiles \
             (user_id, display_name, age, activity_level, height_cm, weight_kg, dietary_type, allergies) \
         VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 'Standard'), $8) \
         ON CONFLICT (user_id) DO UPDATE SET \
             display_name = COALESCE($2, user_profiles.display_name), \
             age = COALESCE($3, user_profiles.age), \
             activity_level = COALESCE($4, user_profiles.activity_level), \
             height_cm = COALESCE($5, user_profiles.height_cm), \
             weight_kg = COALESCE($6, user_profiles.weight_kg), \
             dietary_type = COALESCE($7, user_profiles.dietary_type), \
             allergies = COALESCE($8, user_profiles.allergies), \
             updated_at = now() \
         RETURNING {COLUMNS}"
    ))
    .bind(user_id)
    .bind(&patch.display_name)
    .bind(patch.age)
    .bind(&patch.activity_level)
    .bind(patch.height_cm)
    .bind(patch.weight_kg)
    .bind(&patch.dietary_type)
    .bind(&patch.allergies)
    .fetch_one(db)
    .await
    .context("upsert profile")?;
    Ok(profile)
}
