use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    inventory::engine::{self, OwnerScope},
    kitchens::repo as kitchens_repo,
    state::AppState,
    stock::{
        dto::{AddStockRequest, AddStockResponse, StockQuery, UpdateStockRequest},
        repo::{self, StockPatch},
        repo_types::StockRecord,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stock", get(list_stock).post(add_stock))
        .route("/stock/batch", post(add_stock_batch))
        .route("/stock/:id", axum::routing::put(update_stock).delete(delete_stock))
}

/// Resolve the scope for a request, rejecting kitchens the caller is not a
/// member of.
async fn resolve_scope(
    state: &AppState,
    user_id: Uuid,
    kitchen_id: Option<Uuid>,
) -> Result<OwnerScope, (StatusCode, String)> {
    if let Some(kitchen_id) = kitchen_id {
        let member = kitchens_repo::find_member(&state.db, kitchen_id, user_id)
            .await
            .map_err(internal)?;
        if member.is_none() {
            warn!(%user_id, %kitchen_id, "stock access to foreign kitchen denied");
            return Err((StatusCode::FORBIDDEN, "Not a member of this kitchen".into()));
        }
    }
    Ok(OwnerScope::resolve(user_id, kitchen_id))
}

#[instrument(skip(state))]
pub async fn list_stock(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<StockQuery>,
) -> Result<Json<Vec<StockRecord>>, (StatusCode, String)> {
    let scope = resolve_scope(&state, user_id, q.kitchen_id).await?;
    let records = repo::list_scope(&state.db, scope).await.map_err(internal)?;
    Ok(Json(records))
}

/// Add one item, routing through the reconciliation engine so duplicates
/// merge instead of piling up.
#[instrument(skip(state, body))]
pub async fn add_stock(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<AddStockRequest>,
) -> Result<Json<AddStockResponse>, (StatusCode, String)> {
    if body.item_name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "item_name is required".into()));
    }
    let scope = resolve_scope(&state, user_id, body.kitchen_id).await?;

    let mut tx = state.db.begin().await.map_err(internal)?;
    let response = add_one(&mut tx, user_id, scope, &body).await.map_err(internal)?;
    tx.commit().await.map_err(internal)?;

    info!(%user_id, item = %body.item_name, "stock added");
    Ok(Json(response))
}

/// Bulk add. Each line runs in its own transaction so one bad line cannot
/// roll back the rest.
#[instrument(skip(state, body))]
pub async fn add_stock_batch(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<Vec<AddStockRequest>>,
) -> Result<Json<Vec<AddStockResponse>>, (StatusCode, String)> {
    let mut results = Vec::with_capacity(body.len());
    for item in &body {
        if item.item_name.trim().is_empty() {
            results.push(AddStockResponse {
                message: "Skipped entry with empty item_name.".into(),
                item: None,
            });
            continue;
        }
        let scope = resolve_scope(&state, user_id, item.kitchen_id).await?;
        let mut tx = state.db.begin().await.map_err(internal)?;
        let response = add_one(&mut tx, user_id, scope, item).await.map_err(internal)?;
        tx.commit().await.map_err(internal)?;
        results.push(response);
    }
    info!(%user_id, count = results.len(), "stock batch added");
    Ok(Json(results))
}

async fn add_one(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    scope: OwnerScope,
    body: &AddStockRequest,
) -> anyhow::Result<AddStockResponse> {
    let quantity = body.quantity.as_deref().unwrap_or("1 unit");
    let kitchen_id = match scope {
        OwnerScope::Kitchen(id) => Some(id),
        OwnerScope::User(_) => None,
    };

    let message = engine::add_stock(
        tx,
        user_id,
        kitchen_id,
        &body.item_name,
        quantity,
        body.category.as_deref().unwrap_or("other"),
    )
    .await?;

    // The engine may have merged under a different stored name, so refetch
    // the touched row the same way the matcher found it.
    let item = match repo::find_name_containing_tx(tx, scope, &body.item_name).await? {
        Some(record) => Some(record),
        None => {
            let records = repo::list_scope_tx(tx, scope).await?;
            engine::reverse_match(&records, &body.item_name).cloned()
        }
    };

    let item = match (item, body.expiry_date) {
        (Some(record), Some(expiry)) => {
            repo::update_expiry_tx(tx, record.id, expiry).await?;
            Some(StockRecord {
                expiry_date: Some(expiry),
                ..record
            })
        }
        (item, _) => item,
    };

    Ok(AddStockResponse { message, item })
}

#[instrument(skip(state, body))]
pub async fn update_stock(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStockRequest>,
) -> Result<Json<StockRecord>, (StatusCode, String)> {
    let existing = repo::get_owned(&state.db, id, user_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Item not found".to_string()))?;

    let patch = StockPatch {
        item_name: body.item_name,
        quantity: body.quantity,
        category: body.category,
        expiry_date: body.expiry_date,
    };
    let record = repo::update(&state.db, existing.id, &patch)
        .await
        .map_err(internal)?;
    Ok(Json(record))
}

#[instrument(skip(state))]
pub async fn delete_stock(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let existing = repo::get_owned(&state.db, id, user_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Item not found".to_string()))?;

    repo::delete(&state.db, existing.id).await.map_err(internal)?;
    info!(%user_id, stock_id = %id, "stock deleted");
    Ok(Json(serde_json::json!({ "message": "Item deleted" })))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
