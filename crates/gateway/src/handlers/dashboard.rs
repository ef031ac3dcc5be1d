//! Analysis dashboard page

use axum::{extract::State, response::Response};
use minijinja::context;
use redscope_common::dashboard::SECTIONS;

use crate::AppState;

/// Every section with its charts, in catalog order
pub async fn index(State(state): State<AppState>) -> Response {
    let sections = state.artifacts.render(SECTIONS).await;
    state
        .views
        .page(state.views.render("dashboard.html", context! { sections }))
}
