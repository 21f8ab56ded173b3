use axum::extract::State;
use axum::response::{Html, Redirect};

use crate::api::state::AppState;
use crate::render;

/// The dashboard: cached chain if present, otherwise fetched on the spot.
/// Fetch failures render as an "unavailable" page, never as a 5xx.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let view = state.current_or_refresh().await;
    let opts = state.page_options().await;
    Html(render::html(&view, opts))
}

pub async fn refresh(State(state): State<AppState>) -> Redirect {
    state.refresh().await;
    Redirect::to("/")
}
