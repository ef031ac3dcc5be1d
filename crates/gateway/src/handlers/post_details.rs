//! Single post view with its own chat

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use minijinja::context;
use redscope_common::{
    errors::{AppError, Result},
    media::{classify, MediaKind},
    session::{ChatScope, TranscriptEntry},
    PostRecord,
};
use serde::{Deserialize, Serialize};

use super::{Question, MAX_QUESTION_CHARS};
use crate::{middleware::session::CurrentSession, views::detail_href, AppState};

#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AskPostForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub question: String,
}

/// A post together with its derived links
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub post: PostRecord,
    pub media: Option<MediaKind>,
    pub reddit_url: Option<String>,
    pub author_url: Option<String>,
}

impl From<PostRecord> for PostView {
    fn from(post: PostRecord) -> Self {
        Self {
            media: post.url.as_deref().map(classify),
            reddit_url: post.reddit_url(),
            author_url: post.author_url(),
            post,
        }
    }
}

/// Required, non-blank post identifier
pub fn require_id(id: Option<&str>) -> Result<&str> {
    id.map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(AppError::MissingPostId)
}

pub async fn show(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Query(query): Query<DetailQuery>,
) -> Response {
    state.views.page(render_detail(&state, &session, query.id.as_deref()).await)
}

async fn render_detail(
    state: &AppState,
    session: &CurrentSession,
    id: Option<&str>,
) -> Result<Html<String>> {
    let id = require_id(id)?;
    let dataset = state.datasets.get().await?;
    let view = PostView::from(dataset.post_by_id(id)?);

    let transcript: Vec<TranscriptEntry> = session
        .state
        .lock()
        .await
        .transcript(&ChatScope::Post(view.post.id.clone()))
        .map(|t| t.entries().to_vec())
        .unwrap_or_default();

    state.views.render(
        "post_details.html",
        context! {
            post => view.post,
            media => view.media,
            reddit_url => view.reddit_url,
            author_url => view.author_url,
            transcript,
            qa_error => state.qa.unavailable_reason(),
            max_question_chars => MAX_QUESTION_CHARS,
        },
    )
}

/// Ask about one post, then return to its page
pub async fn ask(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Form(form): Form<AskPostForm>,
) -> Response {
    match ask_about_post(&state, &session, &form).await {
        Ok(href) => Redirect::to(&href).into_response(),
        Err(e) => state.views.error_page(&e),
    }
}

async fn ask_about_post(state: &AppState, session: &CurrentSession, form: &AskPostForm) -> Result<String> {
    let id = require_id(Some(form.id.as_str()))?;
    let question = Question::accept(&form.question)?;
    let dataset = state.datasets.get().await?;

    let mut guard = session.state.lock().await;
    state
        .qa
        .ask(&dataset, &mut guard, ChatScope::Post(id.to_string()), &question)
        .await?;

    Ok(detail_href(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_id() {
        assert_eq!(require_id(Some(" a1 ")).unwrap(), "a1");
        assert!(matches!(require_id(None), Err(AppError::MissingPostId)));
        assert!(matches!(require_id(Some("  ")), Err(AppError::MissingPostId)));
    }
}
