//! Server action handlers.
//!
//! Actions report every outcome, including failures, as an HTTP 200 with a
//! `{"success": ...}` envelope. Extractor failures are folded into the same
//! envelope through [`ActionError::BadInput`].

mod snippets;
mod tags;

use axum::{
    Router,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    routing::{get, post, put},
};
use serde::Deserialize;

use crate::error::ActionError;
use crate::state::AppState;

/// `?q=` query for the search actions.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

impl SearchQuery {
    fn text(&self) -> &str {
        self.q.as_deref().unwrap_or_default()
    }
}

/// Create the server action router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/snippets", post(snippets::create))
        .route("/snippets/search", get(snippets::search))
        .route("/tags", get(tags::list_mine).post(tags::create))
        .route("/tags/popular", get(tags::popular))
        .route("/tags/search", get(tags::search))
        .route("/tags/{id}", put(tags::update).delete(tags::delete))
        .route("/tags/{id}/remove", post(tags::remove_from_my_snippets))
        .route("/tags/{id}/snippets", get(tags::snippets))
}

fn bad_json(rejection: JsonRejection) -> ActionError {
    ActionError::BadInput(rejection.body_text())
}

fn bad_path(rejection: PathRejection) -> ActionError {
    ActionError::BadInput(rejection.body_text())
}

fn bad_query(rejection: QueryRejection) -> ActionError {
    ActionError::BadInput(rejection.body_text())
}
