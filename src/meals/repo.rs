use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::inventory::engine::MealInput;
use crate::meals::repo_types::MealLog;

const COLUMNS: &str = "id, user_id, kitchen_id, name, ingredients_used, confidence, meal_type, \
                       calories, protein_g, carbs_g, fat_g, source, created_at";

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    input: &MealInput,
) -> anyhow::Result<MealLog> {
    let ingredients =
        serde_json::to_value(&input.ingredients_used).context("serialize ingredients_used")?;

    let meal = sqlx::query_as::<_, MealLog>(&format!(
        "INSERT INTO meals (user_id, kitchen_id, name, ingredients_used, confidence, meal_type, \
                            calories, protein_g, carbs_g, fat_g, source) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING {COLUMNS}"
    ))
    .bind(input.user_id)
    .bind(input.kitchen_id)
    .bind(&input.name)
    .bind(ingredients)
    .bind(input.confidence)
    .bind(&input.meal_type)
    .bind(input.calories)
    .bind(input.protein_g)
    .bind(input.carbs_g)
    .bind(input.fat_g)
    .bind(&input.source)
    .fetch_one(&mut **tx)
    .await
    .context("insert meal")?;
    Ok(meal)
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<MealLog>> {
    let meals = sqlx::query_as::<_, MealLog>(&format!(
        "SELECT {COLUMNS} FROM meals \
         WHERE user_id = $1 \
         ORDER BY created_at DESC \
         LIMIT $2 OFFSET $3"
    ))
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list meals")?;
    Ok(meals)
}
