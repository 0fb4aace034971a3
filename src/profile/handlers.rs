use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{repo as users_repo, services::AuthUser},
    profile::{
        dto::{ProfileView, UpdateProfileRequest},
        repo::{self, ProfilePatch},
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileView>, (StatusCode, String)> {
    let user = users_repo::find_by_id(&state.db, user_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;
    let profile = repo::find_by_user(&state.db, user_id)
        .await
        .map_err(internal)?;

    let view = match profile {
        Some(p) => ProfileView {
            user_id,
            email: user.email,
            name: p.display_name.or(user.display_name),
            dietary_preferences: Some(p.dietary_type),
            allergies: p.allergies,
            height_cm: p.height_cm,
            weight_kg: p.weight_kg,
            age: p.age,
            activity_level: p.activity_level,
        },
        None => ProfileView {
            user_id,
            email: user.email,
            name: user.display_name,
            dietary_preferences: None,
            allergies: None,
            height_cm: None,
            weight_kg: None,
            age: None,
            activity_level: None,
        },
    };
    Ok(Json(view))
}

#[instrument(skip(state, body))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileView>, (StatusCode, String)> {
    let patch = ProfilePatch {
        display_name: body.name.clone(),
        age: body.age,
        activity_level: body.activity_level,
        height_cm: body.height_cm,
        weight_kg: body.weight_kg,
        dietary_type: body.dietary_preferences,
        allergies: body.allergies,
    };
    repo::upsert(&state.db, user_id, &patch)
        .await
        .map_err(internal)?;

    if let Some(name) = &body.name {
        users_repo::update_display_name(&state.db, user_id, name)
            .await
            .map_err(internal)?;
    }

    info!(%user_id, "profile updated");
    get_profile(State(state), AuthUser(user_id)).await
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
