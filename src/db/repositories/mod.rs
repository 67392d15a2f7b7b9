//! Database repositories
//!
//! Repository pattern implementations for database access. Each
//! repository handles the queries for a specific entity; published-only
//! filtering lives here so no handler ever sees an unpublished post.

pub mod comment;
pub mod post;
pub mod tag;

pub use comment::{CommentRepository, SqlxCommentRepository};
pub use post::{PostRepository, SqlxPostRepository};
pub use tag::{SqlxTagRepository, TagRepository};
