//! Paginated post list

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Extension,
};
use minijinja::context;
use redscope_common::{dataset::PostSummary, errors::Result};
use serde::Serialize;
use tracing::debug;

use crate::{middleware::session::CurrentSession, views::detail_href, AppState};

/// One line of the post list
#[derive(Debug, Clone, Serialize)]
pub struct PostItem {
    /// 1-based position in the dataset
    pub position: usize,
    pub id: String,
    pub title: String,
    pub preview: Option<String>,
    pub href: String,
}

impl From<PostSummary> for PostItem {
    fn from(summary: PostSummary) -> Self {
        Self {
            href: detail_href(&summary.id),
            position: summary.position,
            id: summary.id,
            title: summary.title,
            preview: summary.preview,
        }
    }
}

/// The first `visible` posts of this session's list
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    state.views.page(render_list(&state, &session).await)
}

async fn render_list(state: &AppState, session: &CurrentSession) -> Result<Html<String>> {
    let dataset = state.datasets.get().await?;
    let config = &state.config.dataset;
    let window = session.state.lock().await.window(config.page_size, dataset.len());

    let posts: Vec<PostItem> = dataset
        .summaries(0, window.shown, config.preview_chars)?
        .into_iter()
        .map(PostItem::from)
        .collect();

    state.views.render("posts.html", context! { window, posts })
}

/// Reveal one more page, then show the list again
pub async fn load_more(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    let dataset = match state.datasets.get().await {
        Ok(dataset) => dataset,
        Err(e) => return state.views.error_page(&e),
    };

    let window = session
        .state
        .lock()
        .await
        .load_more(state.config.dataset.page_size, dataset.len());
    debug!(session = %session.id, shown = window.shown, total = window.total, "Load more");

    Redirect::to("/posts").into_response()
}
