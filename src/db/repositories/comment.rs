//! Comment repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::{Comment, CreateCommentInput};

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a new comment, marked active
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment>;

    /// List active comments for a post, oldest first
    async fn list_active_by_post(&self, post_id: i64) -> Result<Vec<Comment>>;

    /// Count active comments for a post
    async fn count_active_by_post(&self, post_id: i64) -> Result<i64>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: SqlitePool,
}

impl SqlxCommentRepository {
    /// Create a new SQLx comment repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO comments (post_id, name, email, body, active, created_at)
            VALUES (?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(input.post_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.body)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create comment")?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            post_id: input.post_id,
            name: input.name.clone(),
            email: input.email.clone(),
            body: input.body.clone(),
            active: true,
            created_at: now,
        })
    }

    async fn list_active_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, post_id, name, email, body, active, created_at
            FROM comments
            WHERE post_id = ? AND active = 1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list comments for post")?;

        Ok(rows
            .iter()
            .map(|row| Comment {
                id: row.get("id"),
                post_id: row.get("post_id"),
                name: row.get("name"),
                email: row.get("email"),
                body: row.get("body"),
                active: row.get("active"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn count_active_by_post(&self, post_id: i64) -> Result<i64> {
        let row =
            sqlx::query("SELECT COUNT(*) as count FROM comments WHERE post_id = ? AND active = 1")
                .bind(post_id)
                .fetch_one(&self.pool)
                .await
                .context("Failed to count comments for post")?;

        Ok(row.get("count"))
    }
}
