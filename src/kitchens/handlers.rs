use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rand::Rng;
use tracing::{info, instrument};

use crate::{
    auth::services::AuthUser,
    kitchens::{
        dto::{CreateKitchenRequest, JoinKitchenRequest, KitchenResponse},
        repo,
        repo_types::KitchenMembership,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/kitchens", get(list_kitchens).post(create_kitchen))
        .route("/kitchens/join", post(join_kitchen))
}

const INVITE_CODE_LEN: usize = 6;
const INVITE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub(crate) fn generate_invite_code() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_CHARSET[rng.gen_range(0..INVITE_CHARSET.len())] as char)
        .collect()
}

#[instrument(skip(state, body))]
pub async fn create_kitchen(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateKitchenRequest>,
) -> Result<Json<KitchenResponse>, (StatusCode, String)> {
    if body.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name is required".into()));
    }

    // Regenerate on the (unlikely) collision with an existing code.
    let mut code = generate_invite_code();
    while repo::find_by_invite_code(&state.db, &code)
        .await
        .map_err(internal)?
        .is_some()
    {
        code = generate_invite_code();
    }

    let kitchen = repo::insert(&state.db, body.name.trim(), user_id, &code)
        .await
        .map_err(internal)?;
    let member = repo::insert_member(&state.db, kitchen.id, user_id, "admin")
        .await
        .map_err(internal)?;

    info!(%user_id, kitchen_id = %kitchen.id, "kitchen created");
    Ok(Json(KitchenResponse {
        id: kitchen.id,
        name: kitchen.name,
        role: member.role,
        invite_code: kitchen.invite_code,
    }))
}

/// Join by invite code; joining a kitchen you already belong to is a no-op
/// that returns the existing membership.
#[instrument(skip(state, body))]
pub async fn join_kitchen(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<JoinKitchenRequest>,
) -> Result<Json<KitchenResponse>, (StatusCode, String)> {
    let code = body.invite_code.trim().to_uppercase();
    let kitchen = repo::find_by_invite_code(&state.db, &code)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Invalid invite code".to_string()))?;

    let member = match repo::find_member(&state.db, kitchen.id, user_id)
        .await
        .map_err(internal)?
    {
        Some(existing) => existing,
        None => {
            let member = repo::insert_member(&state.db, kitchen.id, user_id, "member")
                .await
                .map_err(internal)?;
            info!(%user_id, kitchen_id = %kitchen.id, "kitchen joined");
            member
        }
    };

    Ok(Json(KitchenResponse {
        id: kitchen.id,
        name: kitchen.name,
        role: member.role,
        invite_code: kitchen.invite_code,
    }))
}

#[instrument(skip(state))]
pub async fn list_kitchens(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<KitchenMembership>>, (StatusCode, String)> {
    let memberships = repo::list_memberships(&state.db, user_id)
        .await
        .map_err(internal)?;
    Ok(Json(memberships))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_codes_are_six_chars_from_the_charset() {
        for _ in 0..50 {
            let code = generate_invite_code();
            assert_eq!(code.len(), INVITE_CODE_LEN);
            assert!(code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }
}
