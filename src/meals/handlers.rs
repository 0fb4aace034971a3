use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::services::AuthUser,
    inventory::engine::{self, MealInput},
    kitchens::repo as kitchens_repo,
    meals::{
        dto::{LogMealRequest, LogMealResponse, Pagination},
        repo,
        repo_types::MealLog,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/meals", get(meal_history).post(log_meal))
}

/// Log a meal and deduct its ingredients from stock in one transaction.
/// Per-ingredient problems come back as report lines in a 200 response; only
/// storage failures surface as errors.
#[instrument(skip(state, body))]
pub async fn log_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<LogMealRequest>,
) -> Result<Json<LogMealResponse>, (StatusCode, String)> {
    if body.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name is required".into()));
    }
    if let Some(kitchen_id) = body.kitchen_id {
        let member = kitchens_repo::find_member(&state.db, kitchen_id, user_id)
            .await
            .map_err(internal)?;
        if member.is_none() {
            warn!(%user_id, %kitchen_id, "meal log for foreign kitchen denied");
            return Err((StatusCode::FORBIDDEN, "Not a member of this kitchen".into()));
        }
    }

    let input = MealInput {
        user_id,
        kitchen_id: body.kitchen_id,
        name: body.name,
        ingredients_used: body.ingredients_used,
        confidence: body.confidence,
        meal_type: body.meal_type,
        calories: body.calories,
        protein_g: body.protein_g,
        carbs_g: body.carbs_g,
        fat_g: body.fat_g,
        deduct_stock: body.deduct_stock,
        source: body.source,
    };

    let mut tx = state.db.begin().await.map_err(internal)?;
    let (meal, deduction_report) = engine::log_meal_and_deduct_stock(&mut tx, input)
        .await
        .map_err(internal)?;
    tx.commit().await.map_err(internal)?;

    info!(%user_id, meal_id = %meal.id, lines = deduction_report.len(), "meal logged");
    Ok(Json(LogMealResponse {
        message: "Meal logged successfully".into(),
        meal_id: meal.id,
        deduction_report,
    }))
}

#[instrument(skip(state))]
pub async fn meal_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<MealLog>>, (StatusCode, String)> {
    let meals = repo::list_by_user(&state.db, user_id, p.limit, p.offset)
        .await
        .map_err(internal)?;
    Ok(Json(meals))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
