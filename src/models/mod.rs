//! Domain models
//!
//! Entity types shared by the repositories, services and handlers.

pub mod comment;
pub mod post;
pub mod tag;

pub use comment::{Comment, CreateCommentInput};
pub use post::{CreatePostInput, Post, PostPage, PostStatus, SimilarPost, POSTS_PER_PAGE};
pub use tag::Tag;
