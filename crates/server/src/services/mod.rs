//! Business logic services.
//!
//! # Services
//!
//! - `access` - Ownership checks shared by every mutating operation
//! - `auth` - Password registration and login
//! - `snippets` - Snippet CRUD, search, and listing by tag
//! - `tags` - Tag CRUD, popular tags, and detaching tags from snippets
//!
//! Services borrow a [`Store`](crate::db::Store) and take the caller's
//! [`UserId`](reusify_core::UserId) explicitly; resolving the caller from the
//! session is the HTTP layer's job.

pub mod access;
pub mod auth;
pub mod snippets;
pub mod tags;

use thiserror::Error;

use crate::db::RepositoryError;

pub use access::{AccessGuard, Operation};
pub use auth::{AuthError, AuthService};
pub use snippets::SnippetService;
pub use tags::TagService;

/// Errors returned by the snippet and tag services.
///
/// The `String` payloads are user-facing messages.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The caller may not perform this operation.
    #[error("{0}")]
    Forbidden(String),

    /// The input failed validation.
    #[error("{0}")]
    Validation(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
