//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use reusify_core::{DisplayName, Email, UserId};

/// A registered user.
///
/// The password hash never leaves the store and auth service, so it is not a
/// field here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Name shown next to the user's snippets.
    pub name: DisplayName,
    /// Login email address.
    pub email: Email,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
