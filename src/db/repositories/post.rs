//! Post repository
//!
//! Database operations for posts. All `*_published` queries pair
//! `status = 'published'` with `publish <= now` so that scheduled posts
//! stay hidden until their publish timestamp has elapsed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::sync::Arc;

use crate::models::{CreatePostInput, Post, PostStatus, SimilarPost};

const POST_COLUMNS: &str = "id, title, slug, body, author, publish, created_at, updated_at, status";

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post (external tooling / test seam)
    async fn create(&self, input: &CreatePostInput) -> Result<Post>;

    /// List published posts ordered by publish descending
    async fn list_published(&self, offset: i64, limit: i64) -> Result<Vec<Post>>;

    /// Count published posts
    async fn count_published(&self) -> Result<i64>;

    /// List published posts carrying a tag, ordered by publish descending
    async fn list_published_by_tag(&self, tag_id: i64, offset: i64, limit: i64)
        -> Result<Vec<Post>>;

    /// Count published posts carrying a tag
    async fn count_published_by_tag(&self, tag_id: i64) -> Result<i64>;

    /// Get the published post with the given slug whose publish
    /// timestamp falls on the given UTC date
    async fn get_published_by_slug_and_date(
        &self,
        slug: &str,
        date: NaiveDate,
    ) -> Result<Option<Post>>;

    /// Get a published post by id
    async fn get_published_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Published posts sharing at least one tag with the given post,
    /// excluding it, ordered by shared-tag count descending then
    /// publish descending
    async fn similar_to(&self, post_id: i64, limit: i64) -> Result<Vec<SimilarPost>>;

    /// Published posts whose title or body contains any of the terms
    /// (case-insensitive). Candidates for search ranking.
    async fn search_candidates(&self, terms: &[String]) -> Result<Vec<Post>>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: SqlitePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, input: &CreatePostInput) -> Result<Post> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO posts (title, slug, body, author, publish, created_at, updated_at, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.body)
        .bind(&input.author)
        .bind(input.publish)
        .bind(now)
        .bind(now)
        .bind(input.status.as_str())
        .execute(&self.pool)
        .await
        .context("Failed to create post")?;

        Ok(Post {
            id: result.last_insert_rowid(),
            title: input.title.clone(),
            slug: input.slug.clone(),
            body: input.body.clone(),
            author: input.author.clone(),
            publish: input.publish,
            created_at: now,
            updated_at: now,
            status: input.status,
        })
    }

    async fn list_published(&self, offset: i64, limit: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE status = 'published' AND publish <= ?
            ORDER BY publish DESC
            LIMIT ? OFFSET ?
            "#
        ))
        .bind(Utc::now())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list published posts")?;

        rows.iter().map(row_to_post).collect()
    }

    async fn count_published(&self) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM posts WHERE status = 'published' AND publish <= ?",
        )
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("Failed to count published posts")?;

        Ok(row.get("count"))
    }

    async fn list_published_by_tag(
        &self,
        tag_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT p.{}
            FROM posts p
            JOIN post_tags pt ON pt.post_id = p.id
            WHERE pt.tag_id = ? AND p.status = 'published' AND p.publish <= ?
            ORDER BY p.publish DESC
            LIMIT ? OFFSET ?
            "#,
            POST_COLUMNS.replace(", ", ", p.")
        ))
        .bind(tag_id)
        .bind(Utc::now())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list published posts by tag")?;

        rows.iter().map(row_to_post).collect()
    }

    async fn count_published_by_tag(&self, tag_id: i64) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) as count
            FROM posts p
            JOIN post_tags pt ON pt.post_id = p.id
            WHERE pt.tag_id = ? AND p.status = 'published' AND p.publish <= ?
            "#,
        )
        .bind(tag_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("Failed to count published posts by tag")?;

        Ok(row.get("count"))
    }

    async fn get_published_by_slug_and_date(
        &self,
        slug: &str,
        date: NaiveDate,
    ) -> Result<Option<Post>> {
        // Half-open day range in UTC
        let day_start: DateTime<Utc> =
            DateTime::from_naive_utc_and_offset(date.and_hms_opt(0, 0, 0).unwrap(), Utc);
        let day_end = day_start + chrono::Duration::days(1);

        let row = sqlx::query(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE slug = ?
              AND status = 'published'
              AND publish >= ? AND publish < ?
              AND publish <= ?
            "#
        ))
        .bind(slug)
        .bind(day_start)
        .bind(day_end)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get post by slug and date")?;

        row.as_ref().map(row_to_post).transpose()
    }

    async fn get_published_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE id = ? AND status = 'published' AND publish <= ?
            "#
        ))
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get published post by id")?;

        row.as_ref().map(row_to_post).transpose()
    }

    async fn similar_to(&self, post_id: i64, limit: i64) -> Result<Vec<SimilarPost>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT p.{}, COUNT(pt.tag_id) as shared_tags
            FROM posts p
            JOIN post_tags pt ON pt.post_id = p.id
            WHERE pt.tag_id IN (SELECT tag_id FROM post_tags WHERE post_id = ?)
              AND p.id != ?
              AND p.status = 'published' AND p.publish <= ?
            GROUP BY p.id
            ORDER BY shared_tags DESC, p.publish DESC
            LIMIT ?
            "#,
            POST_COLUMNS.replace(", ", ", p.")
        ))
        .bind(post_id)
        .bind(post_id)
        .bind(Utc::now())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query similar posts")?;

        rows.iter()
            .map(|row| {
                Ok(SimilarPost {
                    post: row_to_post(row)?,
                    shared_tags: row.get("shared_tags"),
                })
            })
            .collect()
    }

    async fn search_candidates(&self, terms: &[String]) -> Result<Vec<Post>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE status = 'published' AND publish <= "
        ));
        qb.push_bind(Utc::now());
        qb.push(" AND (");
        for (i, term) in terms.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            let pattern = format!("%{}%", term.to_lowercase());
            qb.push("lower(title) LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR lower(body) LIKE ");
            qb.push_bind(pattern);
        }
        qb.push(")");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to query search candidates")?;

        rows.iter().map(row_to_post).collect()
    }
}

fn row_to_post(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    let status_str: String = row.get("status");
    let status = PostStatus::from_str(&status_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid post status in database: {}", status_str))?;

    Ok(Post {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        body: row.get("body"),
        author: row.get("author"),
        publish: row.get("publish"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        status,
    })
}
