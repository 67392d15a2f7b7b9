//! Quillpress - a small content-publishing blog engine

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quillpress::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{SqlxCommentRepository, SqlxPostRepository, SqlxTagRepository},
    },
    services::{CommentService, PostService, SearchService, SmtpMailer},
    theme::ThemeEngine,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quillpress=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Quillpress...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories
    let post_repo = SqlxPostRepository::boxed(pool.clone());
    let tag_repo = SqlxTagRepository::boxed(pool.clone());
    let comment_repo = SqlxCommentRepository::boxed(pool.clone());

    // Initialize services
    let post_service = Arc::new(PostService::new(
        post_repo.clone(),
        tag_repo,
        comment_repo.clone(),
    ));
    let comment_service = Arc::new(CommentService::new(comment_repo));
    let search_service = Arc::new(SearchService::new(post_repo));
    let mailer = Arc::new(SmtpMailer::new(config.smtp.clone()));

    // Initialize theme engine
    let theme = ThemeEngine::new(Path::new(&config.theme.path), &config.theme.active)?;
    tracing::info!("Theme loaded: {}", theme.theme_name());

    // Build application state and router
    let state = AppState {
        post_service,
        comment_service,
        search_service,
        mailer,
        theme: Arc::new(theme),
        site: config.site.clone(),
    };
    let app = api::build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
