//! Dataset-wide chat page

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use minijinja::context;
use redscope_common::{
    errors::Result,
    session::{ChatScope, TranscriptEntry},
    Dataset,
};
use serde::Deserialize;

use super::{Question, MAX_QUESTION_CHARS};
use crate::{middleware::session::CurrentSession, AppState};

#[derive(Debug, Deserialize)]
pub struct AskDatasetForm {
    #[serde(default)]
    pub question: String,
}

/// Headers and the first `rows` rows as plain strings
pub fn preview_table(dataset: &Dataset, rows: usize) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = dataset.headers().map(str::to_string).collect();
    let rows = (0..rows.min(dataset.len()))
        .filter_map(|row| dataset.raw_row(row))
        .map(|record| record.iter().map(str::to_string).collect())
        .collect();
    (headers, rows)
}

pub async fn show(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    state.views.page(render_chat(&state, &session).await)
}

async fn render_chat(state: &AppState, session: &CurrentSession) -> Result<Html<String>> {
    let dataset = state.datasets.get().await?;
    let (headers, rows) = preview_table(&dataset, state.config.dataset.preview_rows);

    let transcript: Vec<TranscriptEntry> = session
        .state
        .lock()
        .await
        .transcript(&ChatScope::Dataset)
        .map(|t| t.entries().to_vec())
        .unwrap_or_default();

    let agent = &state.config.agent;
    state.views.render(
        "chat.html",
        context! {
            headers,
            rows,
            total => dataset.len(),
            context_rows => agent.context_rows.min(dataset.len()),
            strategy => agent.context_strategy.as_str(),
            transcript,
            qa_error => state.qa.unavailable_reason(),
            max_question_chars => MAX_QUESTION_CHARS,
        },
    )
}

/// Ask about the whole dataset, then return to the chat page
pub async fn ask(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Form(form): Form<AskDatasetForm>,
) -> Response {
    match ask_about_dataset(&state, &session, &form.question).await {
        Ok(()) => Redirect::to("/chat").into_response(),
        Err(e) => state.views.error_page(&e),
    }
}

async fn ask_about_dataset(state: &AppState, session: &CurrentSession, raw: &str) -> Result<()> {
    let question = Question::accept(raw)?;
    let dataset = state.datasets.get().await?;

    let mut guard = session.state.lock().await;
    state
        .qa
        .ask(&dataset, &mut guard, ChatScope::Dataset, &question)
        .await?;
    Ok(())
}
