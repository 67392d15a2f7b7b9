//! Post model
//!
//! This module provides:
//! - `Post` entity representing a blog post
//! - `PostStatus` enum for publication states
//! - `CreatePostInput` for the repository write seam (admin tooling, tests)
//! - `PostPage` pagination container for list views

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Fixed page size for public post listings.
pub const POSTS_PER_PAGE: i64 = 3;

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// URL-friendly slug, unique together with the publish date
    pub slug: String,
    /// Body text
    pub body: String,
    /// Author display name
    pub author: String,
    /// Publication timestamp
    pub publish: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Publication status
    pub status: PostStatus,
}

impl Post {
    /// Canonical URL path for this post, `/{yyyy}/{m}/{d}/{slug}`.
    pub fn url_path(&self) -> String {
        format!(
            "/{}/{}/{}/{}",
            self.publish.year(),
            self.publish.month(),
            self.publish.day(),
            self.slug
        )
    }
}

/// Post publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Draft - not visible to public
    #[default]
    Draft,
    /// Published - visible to public once the publish timestamp has elapsed
    Published,
}

impl PostStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    /// Parse status from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            _ => None,
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating a new post
///
/// Posts are authored outside the public handlers; this is the write
/// seam used by external tooling and the tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostInput {
    pub title: String,
    pub slug: String,
    pub body: String,
    pub author: String,
    pub publish: DateTime<Utc>,
    pub status: PostStatus,
}

/// A published post together with its shared-tag count, as produced by
/// the similar-posts query.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarPost {
    #[serde(flatten)]
    pub post: Post,
    /// Number of tags shared with the reference post
    pub shared_tags: i64,
}

/// One page of a post listing.
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    /// Posts on the current page
    pub posts: Vec<Post>,
    /// Current page number (1-indexed, after fallback resolution)
    pub page: u32,
    /// Total number of pages (at least 1, even when empty)
    pub num_pages: u32,
    /// Total number of posts across all pages
    pub total: i64,
}

impl PostPage {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.num_pages
    }

    /// Total pages for a post count, mirroring a paginator that always
    /// reports at least one page.
    pub fn num_pages_for(total: i64, per_page: i64) -> u32 {
        if total <= 0 {
            return 1;
        }
        ((total + per_page - 1) / per_page) as u32
    }
}
