//! HTTP layer
//!
//! Router construction, shared application state, and the page
//! handlers. Routing maps URL patterns to the four components; path and
//! query parameters are extracted by axum.

pub mod error;
pub mod posts;

use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::services::{CommentService, Mailer, PostService, SearchService};
use crate::theme::ThemeEngine;

pub use error::AppError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub post_service: Arc<PostService>,
    pub comment_service: Arc<CommentService>,
    pub search_service: Arc<SearchService>,
    pub mailer: Arc<dyn Mailer>,
    pub theme: Arc<ThemeEngine>,
    pub site: SiteConfig,
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(posts::post_list))
        .route("/tag/{tag_slug}", get(posts::post_list_by_tag))
        .route("/search", get(posts::post_search))
        .route(
            "/share/{id}",
            get(posts::post_share_form).post(posts::post_share),
        )
        .route(
            "/{year}/{month}/{day}/{slug}",
            get(posts::post_detail).post(posts::post_comment),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        CommentRepository, PostRepository, SqlxCommentRepository, SqlxPostRepository,
        SqlxTagRepository, TagRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreatePostInput, PostStatus, Tag};
    use anyhow::Result;
    use async_trait::async_trait;
    use axum_test::TestServer;
    use chrono::{TimeZone, Utc};
    use sqlx::SqlitePool;
    use std::path::Path;
    use std::sync::Mutex;

    /// Mailer that records sends instead of talking SMTP.
    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String, String)>>,
    }

    impl RecordingMailer {
        fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, subject: &str, body: &str, to: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((subject.to_string(), body.to_string(), to.to_string()));
            Ok(())
        }
    }

    async fn test_server() -> (TestServer, SqlitePool, Arc<RecordingMailer>) {
        let pool = create_test_pool().await.expect("test pool");
        migrations::run_migrations(&pool).await.expect("migrations");

        let posts = SqlxPostRepository::boxed(pool.clone());
        let tags = SqlxTagRepository::boxed(pool.clone());
        let comments = SqlxCommentRepository::boxed(pool.clone());

        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState {
            post_service: Arc::new(PostService::new(
                posts.clone(),
                tags.clone(),
                comments.clone(),
            )),
            comment_service: Arc::new(CommentService::new(comments)),
            search_service: Arc::new(SearchService::new(posts)),
            mailer: mailer.clone(),
            theme: Arc::new(ThemeEngine::new(Path::new("themes"), "default").expect("theme")),
            site: SiteConfig::default(),
        };

        let server = TestServer::new(build_router(state)).expect("test server");
        (server, pool, mailer)
    }

    async fn seed_post(pool: &SqlitePool, slug: &str) -> crate::models::Post {
        SqlxPostRepository::new(pool.clone())
            .create(&CreatePostInput {
                title: format!("Title {}", slug),
                slug: slug.to_string(),
                body: "body text".to_string(),
                author: "ann".to_string(),
                publish: Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap(),
                status: PostStatus::Published,
            })
            .await
            .expect("seed post")
    }

    #[tokio::test]
    async fn test_list_renders_published_posts() {
        let (server, pool, _mailer) = test_server().await;
        seed_post(&pool, "hello-world").await;

        let response = server.get("/").await;
        response.assert_status_ok();
        assert!(response.text().contains("Title hello-world"));
    }

    #[tokio::test]
    async fn test_unknown_tag_is_404() {
        let (server, _pool, _mailer) = test_server().await;
        let response = server.get("/tag/no-such-tag").await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_tag_listing_filters() {
        let (server, pool, _mailer) = test_server().await;
        let tag_repo = SqlxTagRepository::new(pool.clone());
        let rust = tag_repo
            .create(&Tag::new("Rust".to_string(), "rust".to_string()))
            .await
            .unwrap();

        let tagged = seed_post(&pool, "tagged").await;
        seed_post(&pool, "untagged").await;
        tag_repo.attach_to_post(rust.id, tagged.id).await.unwrap();

        let response = server.get("/tag/rust").await;
        response.assert_status_ok();
        let text = response.text();
        assert!(text.contains("Title tagged"));
        assert!(!text.contains("Title untagged"));
    }

    #[tokio::test]
    async fn test_detail_matches_exact_date() {
        let (server, pool, _mailer) = test_server().await;
        seed_post(&pool, "hello").await;

        server.get("/2024/5/20/hello").await.assert_status_ok();
        server.get("/2024/5/21/hello").await.assert_status_not_found();
        server.get("/2024/5/20/other").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_comment_submission_round_trip() {
        let (server, pool, _mailer) = test_server().await;
        let post = seed_post(&pool, "hello").await;

        let response = server
            .post("/2024/5/20/hello")
            .form(&[
                ("name", "Bea"),
                ("email", "bea@example.com"),
                ("body", "What a post"),
            ])
            .await;
        response.assert_status_ok();
        assert!(response.text().contains("What a post"));

        let count = SqlxCommentRepository::new(pool.clone())
            .count_active_by_post(post.id)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_invalid_comment_saves_nothing() {
        let (server, pool, _mailer) = test_server().await;
        let post = seed_post(&pool, "hello").await;

        let response = server
            .post("/2024/5/20/hello")
            .form(&[("name", "Bea"), ("email", "nope"), ("body", "")])
            .await;
        response.assert_status_ok();
        assert!(response.text().contains("Enter a valid email address."));

        let count = SqlxCommentRepository::new(pool.clone())
            .count_active_by_post(post.id)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_share_valid_sends_exactly_one_mail() {
        let (server, pool, mailer) = test_server().await;
        let post = seed_post(&pool, "hello").await;

        let response = server
            .post(&format!("/share/{}", post.id))
            .form(&[
                ("name", "Ann"),
                ("email", "ann@example.com"),
                ("to", "bob@example.com"),
                ("comments", "worth reading"),
            ])
            .await;
        response.assert_status_ok();
        assert!(response.text().contains("successfully sent"));
        assert_eq!(mailer.sent_count(), 1);

        let sent = mailer.sent.lock().unwrap();
        let (subject, body, to) = &sent[0];
        assert_eq!(to, "bob@example.com");
        assert!(subject.contains("recommends to read about Title hello"));
        assert!(body.contains("/2024/5/20/hello"));
    }

    #[tokio::test]
    async fn test_share_invalid_recipient_sends_no_mail() {
        let (server, pool, mailer) = test_server().await;
        let post = seed_post(&pool, "hello").await;

        let response = server
            .post(&format!("/share/{}", post.id))
            .form(&[
                ("name", "Ann"),
                ("email", "ann@example.com"),
                ("to", "not-an-address"),
                ("comments", ""),
            ])
            .await;
        response.assert_status_ok();
        let text = response.text();
        assert!(!text.contains("successfully sent"));
        assert!(text.contains("Enter a valid email address."));
        assert_eq!(mailer.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_share_unknown_post_is_404() {
        let (server, _pool, _mailer) = test_server().await;
        server.get("/share/9999").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_search_empty_query_has_no_results() {
        let (server, pool, _mailer) = test_server().await;
        seed_post(&pool, "hello").await;

        let response = server.get("/search").await;
        response.assert_status_ok();
        assert!(!response.text().contains("Title hello"));
    }

    #[tokio::test]
    async fn test_search_title_match_is_listed() {
        let (server, pool, _mailer) = test_server().await;
        seed_post(&pool, "hello").await;

        let response = server.get("/search").add_query_param("query", "hello").await;
        response.assert_status_ok();
        assert!(response.text().contains("Title hello"));
    }
}
