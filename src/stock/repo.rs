use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use time::Date;
use uuid::Uuid;

use crate::inventory::engine::OwnerScope;
use crate::stock::repo_types::StockRecord;

const COLUMNS: &str =
    "id, user_id, kitchen_id, item_name, quantity, category, expiry_date, source, updated_at";

/// First matching pass: substring lookup on item_name within the scope.
/// No ORDER BY — ties resolve to storage order, same as the matcher expects.
pub async fn find_name_containing_tx(
    tx: &mut Transaction<'_, Postgres>,
    scope: OwnerScope,
    name: &str,
) -> anyhow::Result<Option<StockRecord>> {
    let pattern = format!("%{name}%");
    let record = match scope {
        OwnerScope::Kitchen(kitchen_id) => {
            sqlx::query_as::<_, StockRecord>(&format!(
                "SELECT {COLUMNS} FROM kitchen_stock \
                 WHERE kitchen_id = $1 AND item_name ILIKE $2 LIMIT 1"
            ))
            .bind(kitchen_id)
            .bind(&pattern)
            .fetch_optional(&mut **tx)
            .await
        }
        OwnerScope::User(user_id) => {
            sqlx::query_as::<_, StockRecord>(&format!(
                "SELECT {COLUMNS} FROM kitchen_stock \
                 WHERE user_id = $1 AND kitchen_id IS NULL AND item_name ILIKE $2 LIMIT 1"
            ))
            .bind(user_id)
            .bind(&pattern)
            .fetch_optional(&mut **tx)
            .await
        }
    }
    .context("find stock by name")?;
    Ok(record)
}

/// All records in a scope, for the reverse matching pass.
pub async fn list_scope_tx(
    tx: &mut Transaction<'_, Postgres>,
    scope: OwnerScope,
) -> anyhow::Result<Vec<StockRecord>> {
    let records = match scope {
        OwnerScope::Kitchen(kitchen_id) => {
            sqlx::query_as::<_, StockRecord>(&format!(
                "SELECT {COLUMNS} FROM kitchen_stock WHERE kitchen_id = $1"
            ))
            .bind(kitchen_id)
            .fetch_all(&mut **tx)
            .await
        }
        OwnerScope::User(user_id) => {
            sqlx::query_as::<_, StockRecord>(&format!(
                "SELECT {COLUMNS} FROM kitchen_stock WHERE user_id = $1 AND kitchen_id IS NULL"
            ))
            .bind(user_id)
            .fetch_all(&mut **tx)
            .await
        }
    }
    .context("list stock for scope")?;
    Ok(records)
}

pub async fn list_scope(db: &PgPool, scope: OwnerScope) -> anyhow::Result<Vec<StockRecord>> {
    let records = match scope {
        OwnerScope::Kitchen(kitchen_id) => {
            sqlx::query_as::<_, StockRecord>(&format!(
                "SELECT {COLUMNS} FROM kitchen_stock WHERE kitchen_id = $1 ORDER BY updated_at DESC"
            ))
            .bind(kitchen_id)
            .fetch_all(db)
            .await
        }
        OwnerScope::User(user_id) => {
            sqlx::query_as::<_, StockRecord>(&format!(
                "SELECT {COLUMNS} FROM kitchen_stock \
                 WHERE user_id = $1 AND kitchen_id IS NULL ORDER BY updated_at DESC"
            ))
            .bind(user_id)
            .fetch_all(db)
            .await
        }
    }
    .context("list stock for scope")?;
    Ok(records)
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Option<Uuid>,
    kitchen_id: Option<Uuid>,
    item_name: &str,
    quantity: &str,
    category: &str,
    source: &str,
    expiry_date: Option<Date>,
) -> anyhow::Result<StockRecord> {
    let record = sqlx::query_as::<_, StockRecord>(&format!(
        "INSERT INTO kitchen_stock (user_id, kitchen_id, item_name, quantity, category, source, expiry_date) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {COLUMNS}"
    ))
    .bind(user_id)
    .bind(kitchen_id)
    .bind(item_name)
    .bind(quantity)
    .bind(category)
    .bind(source)
    .bind(expiry_date)
    .fetch_one(&mut **tx)
    .await
    .context("insert stock record")?;
    Ok(record)
}

pub async fn update_quantity_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    quantity: &str,
) -> anyhow::Result<()> {
    sqlx::query("UPDATE kitchen_stock SET quantity = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(quantity)
        .execute(&mut **tx)
        .await
        .context("update stock quantity")?;
    Ok(())
}

pub async fn update_expiry_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    expiry_date: Date,
) -> anyhow::Result<()> {
    sqlx::query("UPDATE kitchen_stock SET expiry_date = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(expiry_date)
        .execute(&mut **tx)
        .await
        .context("update stock expiry")?;
    Ok(())
}

pub async fn delete_tx(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM kitchen_stock WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await
        .context("delete stock record")?;
    Ok(())
}

/// Fetch a record the caller may touch: their own, or one in a kitchen they
/// belong to.
pub async fn get_owned(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> anyhow::Result<Option<StockRecord>> {
    let record = sqlx::query_as::<_, StockRecord>(&format!(
        "SELECT {COLUMNS} FROM kitchen_stock \
         WHERE id = $1 AND (user_id = $2 OR kitchen_id IN \
             (SELECT kitchen_id FROM kitchen_members WHERE user_id = $2))"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get owned stock record")?;
    Ok(record)
}

pub struct StockPatch {
    pub item_name: Option<String>,
    pub quantity: Option<String>,
    pub category: Option<String>,
    pub expiry_date: Option<Date>,
}

/// Partial update; absent fields keep their stored values.
pub async fn update(db: &PgPool, id: Uuid, patch: &StockPatch) -> anyhow::Result<StockRecord> {
    let record = sqlx::query_as::<_, StockRecord>(&format!(
        "UPDATE kitchen_stock SET \
             item_name = COALESCE($2, item_name), \
             quantity = COALESCE($3, quantity), \
             category = COALESCE($4, category), \
             expiry_date = COALESCE($5, expiry_date), \
             updated_at = now() \
         WHERE id = $1 \
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(&patch.item_name)
    .bind(&patch.quantity)
    .bind(&patch.category)
    .bind(patch.expiry_date)
    .fetch_one(db)
    .await
    .context("update stock record")?;
    Ok(record)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM kitchen_stock WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete stock record")?;
    Ok(())
}
