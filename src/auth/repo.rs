use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::User;

const COLUMNS: &str = "id, email, password_hash, display_name, created_at";

pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
    let user =
        sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(db)
            .await
            .context("find user by email")?;
    Ok(user)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find user by id")?;
    Ok(user)
}

pub async fn create(
    db: &PgPool,
    email: &str,
    password_hash: &str,
    display_name: Option<&str>,
) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (email, password_hash, display_name) \
         VALUES ($1, $2, $3) \
         RETURNING {COLUMNS}"
    ))
    .bind(email)
    .bind(password_hash)
    .bind(display_name)
    .fetch_one(db)
    .await
    .context("create user")?;
    Ok(user)
}

pub async fn update_display_name(db: &PgPool, id: Uuid, display_name: &str) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET display_name = $2 WHERE id = $1")
        .bind(id)
        .bind(display_name)
        .execute(db)
        .await
        .context("update display name")?;
    Ok(())
}
