//! Blog admin

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{BlogPost, BlogPostCreate, BlogPostUpdate, BlogStatus};

use crate::api::{ApiResult, search_term};
use crate::catalog::BlogQuery;
use crate::state::AppState;
use crate::utils::validation::{
    MAX_CONTENT_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN,
    validate_optional_text, validate_required_text,
};

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/api/admin/blog",
        Router::new()
            .route("/", get(list).post(create))
            .route("/{id}", get(get_by_id).put(update).delete(delete)),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
}

/// GET /api/admin/blog - every status, newest first
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<BlogPost>> {
    let status = match params.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(raw.parse::<BlogStatus>().map_err(|e| {
            AppError::with_message(ErrorCode::InvalidBlogStatus, e.to_string())
        })?),
    };
    let query = BlogQuery {
        status,
        category: params.category.filter(|c| !c.trim().is_empty()),
    };
    let mut posts = state.store.list_blog_posts(&query).await?;
    if let Some(q) = search_term(params.q.as_deref()) {
        posts.retain(|p| p.matches_search(&q));
    }
    Ok(Json(posts))
}

/// GET /api/admin/blog/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<BlogPost> {
    Ok(Json(state.store.get_blog_post(&id).await?))
}

/// POST /api/admin/blog - new posts default to draft
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<BlogPostCreate>,
) -> ApiResult<BlogPost> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_required_text(&payload.author, "author", MAX_NAME_LEN)?;
    validate_required_text(&payload.category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.excerpt, "excerpt", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.content, "content", MAX_CONTENT_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;

    let post = state.store.create_blog_post(&payload).await?;
    tracing::info!(id = %post.id, status = %post.status.as_str(), "Blog post created");
    Ok(Json(post))
}

/// PUT /api/admin/blog/{id} - first publish stamps `published_at`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<BlogPostUpdate>,
) -> ApiResult<BlogPost> {
    if let Some(title) = &payload.title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    if let Some(author) = &payload.author {
        validate_required_text(author, "author", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.excerpt, "excerpt", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.content, "content", MAX_CONTENT_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;

    Ok(Json(state.store.update_blog_post(&id, &payload).await?))
}

/// DELETE /api/admin/blog/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<bool> {
    state.store.delete_blog_post(&id).await?;
    Ok(Json(true))
}
