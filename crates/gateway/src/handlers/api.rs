//! JSON API over the same state as the pages

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use redscope_common::{
    errors::{AppError, Result},
    qa::Exchange,
    session::{ChatScope, SessionSnapshot},
};
use serde::{Deserialize, Serialize};

use super::{post_details::PostView, posts::PostItem, Question};
use crate::{
    middleware::session::{expired_cookie_header, CurrentSession},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub offset: usize,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub total: usize,
    pub offset: usize,
    pub posts: Vec<PostItem>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    /// Ask about one post instead of the whole dataset
    #[serde(default)]
    pub post_id: Option<String>,
}

/// A slice of the post list; `limit` is capped at one page
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PostListResponse>> {
    let dataset = state.datasets.get().await?;
    let config = &state.config.dataset;
    let limit = params
        .limit
        .unwrap_or(config.page_size)
        .clamp(1, config.page_size.max(1));
    let end = params.offset.saturating_add(limit);

    let posts = dataset
        .summaries(params.offset, end, config.preview_chars)?
        .into_iter()
        .map(PostItem::from)
        .collect();

    Ok(Json(PostListResponse {
        total: dataset.len(),
        offset: params.offset,
        posts,
    }))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostView>> {
    let dataset = state.datasets.get().await?;
    Ok(Json(PostView::from(dataset.post_by_id(&id)?)))
}

/// Ask a question and return the recorded exchange
pub async fn chat(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Exchange>> {
    let question = Question::accept(&request.question)?;
    let scope = match request.post_id.as_deref().map(str::trim) {
        Some("") => return Err(AppError::MissingPostId),
        Some(id) => ChatScope::Post(id.to_string()),
        None => ChatScope::Dataset,
    };
    let dataset = state.datasets.get().await?;

    let mut guard = session.state.lock().await;
    let exchange = state.qa.ask(&dataset, &mut guard, scope, &question).await?;
    Ok(Json(exchange))
}

pub async fn session_snapshot(Extension(session): Extension<CurrentSession>) -> Json<SessionSnapshot> {
    Json(session.state.lock().await.snapshot())
}

/// Forget the session and clear the cookie
pub async fn end_session(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    state.sessions.end(session.id).await;
    let cookie = expired_cookie_header(&state.config.session.cookie_name);
    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]).into_response()
}
