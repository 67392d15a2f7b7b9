//! Post service
//!
//! Listing with page-token fallback, detail lookup by slug and exact
//! publish date, and the similar-posts computation.

use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;

use crate::db::repositories::{CommentRepository, PostRepository, TagRepository};
use crate::models::{Comment, Post, PostPage, SimilarPost, Tag, POSTS_PER_PAGE};

/// How many similar posts to show on a detail page.
const SIMILAR_POSTS_LIMIT: i64 = 4;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Post or tag not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Everything a detail page needs.
#[derive(Debug)]
pub struct PostDetail {
    pub post: Post,
    pub tags: Vec<Tag>,
    pub comments: Vec<Comment>,
    pub similar: Vec<SimilarPost>,
}

/// Post service for the public read paths
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    tags: Arc<dyn TagRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        tags: Arc<dyn TagRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            posts,
            tags,
            comments,
        }
    }

    /// One page of published posts, optionally restricted to a tag.
    ///
    /// The page token is whatever arrived in the query string; fallback
    /// resolution never turns it into an error. An unknown tag slug is
    /// NotFound.
    pub async fn list_page(
        &self,
        tag_slug: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<(PostPage, Option<Tag>), PostServiceError> {
        let tag = match tag_slug {
            Some(slug) => Some(
                self.tags
                    .get_by_slug(slug)
                    .await?
                    .ok_or_else(|| PostServiceError::NotFound(format!("tag: {}", slug)))?,
            ),
            None => None,
        };

        let total = match &tag {
            Some(tag) => self.posts.count_published_by_tag(tag.id).await?,
            None => self.posts.count_published().await?,
        };

        let num_pages = PostPage::num_pages_for(total, POSTS_PER_PAGE);
        let page = resolve_page(page_token, num_pages);
        let offset = (page as i64 - 1) * POSTS_PER_PAGE;

        let posts = match &tag {
            Some(tag) => {
                self.posts
                    .list_published_by_tag(tag.id, offset, POSTS_PER_PAGE)
                    .await?
            }
            None => self.posts.list_published(offset, POSTS_PER_PAGE).await?,
        };

        Ok((
            PostPage {
                posts,
                page,
                num_pages,
                total,
            },
            tag,
        ))
    }

    /// Detail lookup by year/month/day/slug.
    ///
    /// An impossible calendar date is NotFound, same as a missing post.
    pub async fn detail(
        &self,
        year: i32,
        month: u32,
        day: u32,
        slug: &str,
    ) -> Result<PostDetail, PostServiceError> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| PostServiceError::NotFound(format!("{}-{}-{}", year, month, day)))?;

        let post = self
            .posts
            .get_published_by_slug_and_date(slug, date)
            .await?
            .ok_or_else(|| PostServiceError::NotFound(format!("post: {}", slug)))?;

        let tags = self.tags.get_by_post_id(post.id).await?;
        let comments = self.comments.list_active_by_post(post.id).await?;
        let similar = self.posts.similar_to(post.id, SIMILAR_POSTS_LIMIT).await?;

        Ok(PostDetail {
            post,
            tags,
            comments,
            similar,
        })
    }

    /// Share-page lookup: published post by id.
    pub async fn get_published(&self, id: i64) -> Result<Post, PostServiceError> {
        self.posts
            .get_published_by_id(id)
            .await?
            .ok_or_else(|| PostServiceError::NotFound(format!("post id: {}", id)))
    }
}

/// Resolve a raw page token against the page count.
///
/// A missing or non-integer token falls back to page 1; an integer
/// token outside the valid range (below 1 or past the last page) falls
/// back to the last page. Integers too large for i64 are still
/// integers past the last page, not garbage.
pub fn resolve_page(token: Option<&str>, num_pages: u32) -> u32 {
    let num_pages = num_pages.max(1);
    let Some(raw) = token else { return 1 };
    let raw = raw.trim();
    match raw.parse::<i64>() {
        Ok(n) if n >= 1 && n <= num_pages as i64 => n as u32,
        Ok(_) => num_pages,
        Err(_) if is_integer(raw) => num_pages,
        Err(_) => 1,
    }
}

/// An optionally signed run of digits, of any length.
fn is_integer(raw: &str) -> bool {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        CommentRepository, PostRepository, SqlxCommentRepository, SqlxPostRepository,
        SqlxTagRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreateCommentInput, CreatePostInput, PostStatus};
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use sqlx::SqlitePool;

    async fn setup() -> (SqlitePool, PostService) {
        let pool = create_test_pool().await.expect("test pool");
        migrations::run_migrations(&pool).await.expect("migrations");

        let service = PostService::new(
            SqlxPostRepository::boxed(pool.clone()),
            SqlxTagRepository::boxed(pool.clone()),
            SqlxCommentRepository::boxed(pool.clone()),
        );
        (pool, service)
    }

    async fn seed_published(pool: &SqlitePool, count: usize) {
        let repo = SqlxPostRepository::new(pool.clone());
        let now = Utc::now();
        for i in 0..count {
            repo.create(&CreatePostInput {
                title: format!("Post {}", i),
                slug: format!("post-{}", i),
                body: "body".to_string(),
                author: "ann".to_string(),
                publish: now - Duration::hours(1 + i as i64),
                status: PostStatus::Published,
            })
            .await
            .expect("create post");
        }
    }

    #[tokio::test]
    async fn test_list_page_paginates_at_three() {
        let (pool, service) = setup().await;
        seed_published(&pool, 7).await;

        let (page, tag) = service.list_page(None, None).await.unwrap();
        assert!(tag.is_none());
        assert_eq!(page.posts.len(), 3);
        assert_eq!(page.page, 1);
        assert_eq!(page.num_pages, 3);
        assert_eq!(page.total, 7);
        assert!(!page.has_prev());
        assert!(page.has_next());

        let (last, _) = service.list_page(None, Some("3")).await.unwrap();
        assert_eq!(last.posts.len(), 1);
        assert!(last.has_prev());
        assert!(!last.has_next());
    }

    #[tokio::test]
    async fn test_list_page_token_fallbacks() {
        let (pool, service) = setup().await;
        seed_published(&pool, 4).await;

        // Non-numeric token falls back to page 1
        let (page, _) = service.list_page(None, Some("abc")).await.unwrap();
        assert_eq!(page.page, 1);

        // Past-the-end token falls back to the last page
        let (page, _) = service.list_page(None, Some("99")).await.unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(page.posts.len(), 1);
    }

    #[tokio::test]
    async fn test_list_page_unknown_tag_is_not_found() {
        let (_pool, service) = setup().await;
        let err = service.list_page(Some("missing"), None).await.unwrap_err();
        assert!(matches!(err, PostServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_detail_rejects_wrong_date_and_impossible_date() {
        let (pool, service) = setup().await;
        let repo = SqlxPostRepository::new(pool.clone());
        let publish = Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap();
        repo.create(&CreatePostInput {
            title: "Hello".to_string(),
            slug: "hello".to_string(),
            body: "body".to_string(),
            author: "ann".to_string(),
            publish,
            status: PostStatus::Published,
        })
        .await
        .unwrap();

        let detail = service.detail(2024, 5, 20, "hello").await.unwrap();
        assert_eq!(detail.post.slug, "hello");

        assert!(matches!(
            service.detail(2024, 5, 21, "hello").await,
            Err(PostServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.detail(2024, 2, 30, "hello").await,
            Err(PostServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_detail_includes_active_comments() {
        let (pool, service) = setup().await;
        let repo = SqlxPostRepository::new(pool.clone());
        let comments = SqlxCommentRepository::new(pool.clone());
        let publish = Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap();
        let post = repo
            .create(&CreatePostInput {
                title: "Hello".to_string(),
                slug: "hello".to_string(),
                body: "body".to_string(),
                author: "ann".to_string(),
                publish,
                status: PostStatus::Published,
            })
            .await
            .unwrap();
        comments
            .create(&CreateCommentInput {
                post_id: post.id,
                name: "Bea".to_string(),
                email: "bea@example.com".to_string(),
                body: "First!".to_string(),
            })
            .await
            .unwrap();

        let detail = service.detail(2024, 5, 20, "hello").await.unwrap();
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].name, "Bea");
    }

    #[test]
    fn test_resolve_page_edges() {
        assert_eq!(resolve_page(None, 5), 1);
        assert_eq!(resolve_page(Some("2"), 5), 2);
        assert_eq!(resolve_page(Some("0"), 5), 5);
        assert_eq!(resolve_page(Some("-3"), 5), 5);
        assert_eq!(resolve_page(Some("6"), 5), 5);
        assert_eq!(resolve_page(Some("two"), 5), 1);
        assert_eq!(resolve_page(Some(""), 5), 1);
    }

    #[test]
    fn test_resolve_page_overflowing_integer_is_last_page() {
        // Longer than i64 can hold, but still an integer past the end
        assert_eq!(resolve_page(Some("99999999999999999999"), 5), 5);
        assert_eq!(resolve_page(Some("+99999999999999999999"), 5), 5);
        assert_eq!(resolve_page(Some("-99999999999999999999"), 5), 5);
        // Not plain integers: back to page 1
        assert_eq!(resolve_page(Some("9e99"), 5), 1);
        assert_eq!(resolve_page(Some("1 0"), 5), 1);
    }

    proptest! {
        // Whatever the token, the resolved page is always in range.
        #[test]
        fn prop_resolved_page_in_range(token in ".*", num_pages in 1u32..1000) {
            let page = resolve_page(Some(&token), num_pages);
            prop_assert!(page >= 1 && page <= num_pages);
        }

        // Tokens that are not integers always resolve to page 1.
        #[test]
        fn prop_non_numeric_token_is_page_one(token in "[a-zA-Z ]+", num_pages in 1u32..1000) {
            prop_assert_eq!(resolve_page(Some(&token), num_pages), 1);
        }
    }
}
