//! Page handlers
//!
//! The four public components: post listing (optionally by tag), post
//! detail with comment submission, share-by-email, and search. Each
//! handler composes repository queries through the services and renders
//! a template through the theme engine.

use axum::{
    extract::{Path, Query, State},
    response::Html,
    Form,
};
use serde::Deserialize;
use serde_json::json;
use tera::Context as TeraContext;

use crate::api::{error::AppError, AppState};
use crate::forms::{FormErrors, RawCommentForm, RawSearchForm, RawShareForm, ShareForm};
use crate::models::Post;
use crate::services::mailer::share_email;
use crate::services::post::PostDetail;

/// Query parameters for the list pages.
///
/// The page token is kept as a raw string; fallback resolution happens
/// in the service and never rejects a request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
}

/// GET / — published posts, newest first, three per page.
pub async fn post_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, AppError> {
    render_list(&state, None, query.page.as_deref()).await
}

/// GET /tag/{tag_slug} — published posts carrying the tag.
pub async fn post_list_by_tag(
    State(state): State<AppState>,
    Path(tag_slug): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, AppError> {
    render_list(&state, Some(&tag_slug), query.page.as_deref()).await
}

async fn render_list(
    state: &AppState,
    tag_slug: Option<&str>,
    page_token: Option<&str>,
) -> Result<Html<String>, AppError> {
    let (page, tag) = state.post_service.list_page(tag_slug, page_token).await?;

    let mut ctx = base_context(state);
    ctx.insert(
        "posts",
        &page.posts.iter().map(post_json).collect::<Vec<_>>(),
    );
    ctx.insert("page", &page.page);
    ctx.insert("num_pages", &page.num_pages);
    ctx.insert("has_prev", &page.has_prev());
    ctx.insert("has_next", &page.has_next());
    ctx.insert("tag", &tag);

    Ok(Html(state.theme.render("list.html", &ctx)?))
}

/// GET /{year}/{month}/{day}/{slug} — one published post.
pub async fn post_detail(
    State(state): State<AppState>,
    Path((year, month, day, slug)): Path<(i32, u32, u32, String)>,
) -> Result<Html<String>, AppError> {
    let detail = state.post_service.detail(year, month, day, &slug).await?;
    render_detail(&state, detail, &RawCommentForm::default(), None, false)
}

/// POST /{year}/{month}/{day}/{slug} — comment submission.
///
/// A valid comment is saved active and shown immediately; an invalid
/// one re-renders the page with field errors and writes nothing.
pub async fn post_comment(
    State(state): State<AppState>,
    Path((year, month, day, slug)): Path<(i32, u32, u32, String)>,
    Form(raw): Form<RawCommentForm>,
) -> Result<Html<String>, AppError> {
    let detail = state.post_service.detail(year, month, day, &slug).await?;

    match state
        .comment_service
        .submit(detail.post.id, &raw)
        .await
        .map_err(AppError::Internal)?
    {
        Ok(_saved) => {
            // Refetch so the new comment appears in the rendered list
            let detail = state.post_service.detail(year, month, day, &slug).await?;
            render_detail(&state, detail, &RawCommentForm::default(), None, true)
        }
        Err(errors) => render_detail(&state, detail, &raw, Some(errors), false),
    }
}

fn render_detail(
    state: &AppState,
    detail: PostDetail,
    form: &RawCommentForm,
    errors: Option<FormErrors>,
    saved: bool,
) -> Result<Html<String>, AppError> {
    let mut ctx = base_context(state);
    ctx.insert("post", &post_json(&detail.post));
    ctx.insert("tags", &detail.tags);
    ctx.insert("comments", &detail.comments);
    ctx.insert(
        "similar",
        &detail
            .similar
            .iter()
            .map(|s| post_json(&s.post))
            .collect::<Vec<_>>(),
    );
    ctx.insert("form", form);
    ctx.insert("errors", &errors.as_ref().map(FormErrors::messages));
    ctx.insert("saved", &saved);

    Ok(Html(state.theme.render("detail.html", &ctx)?))
}

/// GET /share/{id} — empty share form.
pub async fn post_share_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let post = state.post_service.get_published(id).await?;
    render_share(&state, &post, &RawShareForm::default(), None, false)
}

/// POST /share/{id} — validated share submission.
///
/// On success the notification goes out through the mailer and the page
/// reports sent = true. A transport failure is not caught here; it
/// propagates as a 500.
pub async fn post_share(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(raw): Form<RawShareForm>,
) -> Result<Html<String>, AppError> {
    let post = state.post_service.get_published(id).await?;

    match ShareForm::validate(&raw) {
        Ok(form) => {
            let post_url = format!(
                "{}{}",
                state.site.base_url.trim_end_matches('/'),
                post.url_path()
            );
            let (subject, body) = share_email(&form, &post, &post_url);
            state
                .mailer
                .send(&subject, &body, &form.to)
                .await
                .map_err(AppError::Internal)?;
            tracing::info!(post_id = post.id, to = %form.to, "share email sent");
            render_share(&state, &post, &raw, None, true)
        }
        Err(errors) => render_share(&state, &post, &raw, Some(errors), false),
    }
}

fn render_share(
    state: &AppState,
    post: &Post,
    form: &RawShareForm,
    errors: Option<FormErrors>,
    sent: bool,
) -> Result<Html<String>, AppError> {
    let mut ctx = base_context(state);
    ctx.insert("post", &post_json(post));
    ctx.insert("form", form);
    ctx.insert("errors", &errors.as_ref().map(FormErrors::messages));
    ctx.insert("sent", &sent);

    Ok(Html(state.theme.render("share.html", &ctx)?))
}

/// GET /search — ranked full-text search.
pub async fn post_search(
    State(state): State<AppState>,
    Query(raw): Query<RawSearchForm>,
) -> Result<Html<String>, AppError> {
    let query = raw.cleaned_query();

    let results = match &query {
        Some(q) => state
            .search_service
            .search(q)
            .await
            .map_err(AppError::Internal)?,
        None => Vec::new(),
    };

    let mut ctx = base_context(&state);
    ctx.insert("query", &query.unwrap_or_default());
    ctx.insert("total_results", &results.len());
    ctx.insert(
        "results",
        &results
            .iter()
            .map(|r| {
                let mut value = post_json(&r.post);
                value["rank"] = json!(r.rank);
                value
            })
            .collect::<Vec<_>>(),
    );

    Ok(Html(state.theme.render("search.html", &ctx)?))
}

fn base_context(state: &AppState) -> TeraContext {
    let mut ctx = TeraContext::new();
    ctx.insert("site_name", &state.site.name);
    ctx
}

/// A post as the templates see it, with its canonical URL precomputed.
fn post_json(post: &Post) -> serde_json::Value {
    json!({
        "id": post.id,
        "title": post.title,
        "slug": post.slug,
        "body": post.body,
        "author": post.author,
        "publish": post.publish,
        "url": post.url_path(),
    })
}
