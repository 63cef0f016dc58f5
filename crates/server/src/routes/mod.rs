//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness
//! GET  /health/ready                   - Readiness (store ping)
//!
//! # Snippets JSON API (status codes, {"error": msg} on failure)
//! GET    /api/snippets/me              - Caller's snippets
//! POST   /api/snippets/create          - Create snippet (201)
//! GET    /api/snippets/{id}            - Snippet with owner summary
//! PUT    /api/snippets/{id}            - Update snippet
//! DELETE /api/snippets/{id}            - Delete snippet
//!
//! # Auth JSON API
//! POST /api/auth/register              - Register and log in (201)
//! POST /api/auth/login                 - Log in
//! POST /api/auth/logout                - Log out (204)
//! GET  /api/auth/session               - Current user
//!
//! # Server actions (always 200, {"success": ...} envelope)
//! POST   /actions/snippets             - createSnippet
//! GET    /actions/snippets/search?q=   - searchSnippets
//! GET    /actions/tags                 - getUserTags
//! POST   /actions/tags                 - createTag
//! GET    /actions/tags/popular?limit=  - getPopularTags
//! GET    /actions/tags/search?q=       - searchTags
//! PUT    /actions/tags/{id}            - updateTag
//! DELETE /actions/tags/{id}            - deleteTag
//! POST   /actions/tags/{id}/remove     - removeTagFromUserSnippets
//! GET    /actions/tags/{id}/snippets   - getSnippetsByTag
//! ```

pub mod actions;
pub mod auth;
pub mod health;
pub mod snippets;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the snippet JSON API router.
pub fn snippet_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(snippets::list_mine))
        .route("/create", post(snippets::create))
        .route(
            "/{id}",
            get(snippets::show)
                .put(snippets::update)
                .delete(snippets::delete),
        )
}

/// Create the auth JSON API router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/snippets", snippet_routes())
        .nest("/api/auth", auth_routes())
        .nest("/actions", actions::routes())
}
