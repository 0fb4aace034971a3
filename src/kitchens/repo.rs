use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::kitchens::repo_types::{Kitchen, KitchenMember, KitchenMembership};

pub async fn insert(db: &PgPool, name: &str, owner_id: Uuid, invite_code: &str) -> anyhow::Result<Kitchen> {
    let kitchen = sqlx::query_as::<_, Kitchen>(
        r#"
        INSERT INTO kitchens (name, owner_id, invite_code)
        VALUES ($1, $2, $3)
        RETURNING id, name, owner_id, invite_code, created_at
        "#,
    )
    .bind(name)
    .bind(owner_id)
    .bind(invite_code)
    .fetch_one(db)
    .await
    .context("insert kitchen")?;
    Ok(kitchen)
}

pub async fn find_by_invite_code(db: &PgPool, code: &str) -> anyhow::Result<Option<Kitchen>> {
    let kitchen = sqlx::query_as::<_, Kitchen>(
        r#"
        SELECT id, name, owner_id, invite_code, created_at
        FROM kitchens
        WHERE invite_code = $1
        "#,
    )
    .bind(code)
    .fetch_optional(db)
    .await
    .context("find kitchen by invite code")?;
    Ok(kitchen)
}

pub async fn find_member(
    db: &PgPool,
    kitchen_id: Uuid,
    user_id: Uuid,
) -> anyhow::Result<Option<KitchenMember>> {
    let member = sqlx::query_as::<_, KitchenMember>(
        r#"
        SELECT id, kitchen_id, user_id, role, joined_at
        FROM kitchen_members
        WHERE kitchen_id = $1 AND user_id = $2
        "#,
    )
    .bind(kitchen_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("find kitchen member")?;
    Ok(member)
}

pub async fn insert_member(
    db: &PgPool,
    kitchen_id: Uuid,
    user_id: Uuid,
    role: &str,
) -> anyhow::Result<KitchenMember> {
    let member = sqlx::query_as::<_, KitchenMember>(
        r#"
        INSERT INTO kitchen_members (kitchen_id, user_id, role)
        VALUES ($1, $2, $3)
        RETURNING id, kitchen_id, user_id, role, joined_at
        "#,
    )
    .bind(kitchen_id)
    .bind(user_id)
    .bind(role)
    .fetch_one(db)
    .await
    .context("insert kitchen member")?;
    Ok(member)
}

/// All kitchens the user belongs to, newest membership first.
pub async fn list_memberships(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<KitchenMembership>> {
    let rows = sqlx::query_as::<_, KitchenMembership>(
        r#"
        SELECT k.id, k.name, m.role, k.invite_code
        FROM kitchen_members m
        JOIN kitchens k ON k.id = m.kitchen_id
        WHERE m.user_id = $1
        ORDER BY m.joined_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list kitchen memberships")?;
    Ok(rows)
}
