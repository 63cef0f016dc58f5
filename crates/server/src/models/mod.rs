//! Domain models for the snippet service.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db::postgres`] and from the JSON shapes in [`crate::routes`].

pub mod session;
pub mod snippet;
pub mod tag;
pub mod user;

pub use session::{CurrentUser, keys as session_keys};
pub use snippet::{NewSnippet, OwnerSummary, Snippet, SnippetChanges, SnippetInput};
pub use tag::{Tag, TagUsage};
pub use user::User;
