use std::sync::Arc;

use axum::{extract::State, response::Html};
use log::warn;

use crate::{templates::home_page, AppState};

/// Landing page listing the available routes (GET /)
pub async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let span = match state.queries.date_span().await {
        Ok(span) => Some(span),
        Err(e) => {
            warn!("landing page rendered without date span: {}", e);
            None
        }
    };
    Html(home_page(&state.remote_url, span.as_ref()).into_string())
}
