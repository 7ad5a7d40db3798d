//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::db_error::is_unique_violation_on_code;

/// PostgreSQL repository for link storage and retrieval.
///
/// Every read joins `users` so the returned [`Link`] carries its owner's
/// username.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    original_url: String,
    code: String,
    click_count: i64,
    created_at: DateTime<Utc>,
    user_id: i64,
    username: String,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link {
            id: r.id,
            original_url: r.original_url,
            code: r.code,
            click_count: r.click_count,
            created_at: r.created_at,
            owner_id: r.user_id,
            owner_username: r.username,
        }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            WITH inserted AS (
                INSERT INTO links (original_url, code, user_id, created_at)
                VALUES ($1, $2, $3, $4)
                RETURNING id, original_url, code, click_count, created_at, user_id
            )
            SELECT i.id, i.original_url, i.code, i.click_count, i.created_at, i.user_id, u.username
            FROM inserted i
            JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(&new_link.original_url)
        .bind(&new_link.code)
        .bind(new_link.owner_id)
        .bind(new_link.created_at)
        .fetch_one(self.pool.as_ref())
        .await
        .inspect_err(|e| {
            if is_unique_violation_on_code(e) {
                tracing::warn!(code = %new_link.code, "Short code collision on insert");
            }
        })?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT l.id, l.original_url, l.code, l.click_count, l.created_at, l.user_id, u.username
            FROM links l
            JOIN users u ON u.id = l.user_id
            WHERE l.code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT l.id, l.original_url, l.code, l.click_count, l.created_at, l.user_id, u.username
            FROM links l
            JOIN users u ON u.id = l.user_id
            WHERE l.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<Link>, AppError> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT l.id, l.original_url, l.code, l.click_count, l.created_at, l.user_id, u.username
            FROM links l
            JOIN users u ON u.id = l.user_id
            WHERE l.user_id = $1
            ORDER BY l.created_at DESC, l.id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, link: &Link) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            WITH updated AS (
                UPDATE links
                SET click_count = GREATEST(click_count, $2)
                WHERE id = $1
                RETURNING id, original_url, code, click_count, created_at, user_id
            )
            SELECT up.id, up.original_url, up.code, up.click_count, up.created_at, up.user_id, u.username
            FROM updated up
            JOIN users u ON u.id = up.user_id
            "#,
        )
        .bind(link.id)
        .bind(link.click_count)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Into::into)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": link.id })))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
