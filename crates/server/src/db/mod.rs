//! Persistence for users, snippets and tags.
//!
//! # Database: `reusify`
//!
//! ## Tables
//!
//! - `reusify.users` - Registered users and their password hashes
//! - `reusify.snippet` - Code snippets, one owning user each
//! - `reusify.tag` - Platform-wide unique tag names
//! - `reusify.snippet_tag` - Many-to-many join, cascades from both sides
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Store port
//!
//! The access layers talk to the [`Store`] trait, never to `sqlx` directly.
//! [`postgres::PgStore`] is the production adapter; [`memory::MemoryStore`]
//! keeps everything in process for tests and demos.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p reusify-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

use reusify_core::{DisplayName, Email, SnippetId, TagId, TagName, UserId};

use crate::models::{NewSnippet, Snippet, SnippetChanges, Tag, TagUsage, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or tag name).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Errors raised while migrating the schema.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Applying the SQL migrations failed.
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Creating the session table failed.
    #[error("session store migration error: {0}")]
    SessionStore(#[from] sqlx::Error),
}

// =============================================================================
// Store Port
// =============================================================================

/// User persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user.
    ///
    /// Returns `RepositoryError::Conflict` if the email is taken.
    async fn create_user(
        &self,
        name: &DisplayName,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError>;

    /// Get a user by ID.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Get a user by email.
    async fn get_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Get a user together with their password hash.
    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;
}

/// Snippet persistence. Every returned [`Snippet`] carries its tags.
#[async_trait]
pub trait SnippetStore: Send + Sync {
    /// All snippets owned by `owner`, most recently updated first.
    async fn list_snippets_for_owner(&self, owner: UserId)
    -> Result<Vec<Snippet>, RepositoryError>;

    /// A single snippet by ID, regardless of owner.
    async fn get_snippet(&self, id: SnippetId) -> Result<Option<Snippet>, RepositoryError>;

    /// The owner of a snippet, without loading the row's content.
    async fn snippet_owner(&self, id: SnippetId) -> Result<Option<UserId>, RepositoryError>;

    /// Insert a snippet, resolving its tag names by find-or-create.
    /// Tags created here are recorded as created by `owner`.
    async fn create_snippet(
        &self,
        owner: UserId,
        snippet: &NewSnippet,
    ) -> Result<Snippet, RepositoryError>;

    /// Apply `changes` and bump `updated_at`. A `Some` tag list replaces the
    /// whole association set; new tags are recorded as created by `actor`.
    ///
    /// Returns `RepositoryError::NotFound` if the snippet does not exist.
    async fn update_snippet(
        &self,
        id: SnippetId,
        actor: UserId,
        changes: &SnippetChanges,
    ) -> Result<Snippet, RepositoryError>;

    /// Delete a snippet and its tag associations. Returns `false` if it did
    /// not exist.
    async fn delete_snippet(&self, id: SnippetId) -> Result<bool, RepositoryError>;

    /// Case-insensitive substring search over title, content and tag names,
    /// limited to `owner`'s snippets, most recently updated first.
    async fn search_snippets(
        &self,
        owner: UserId,
        query: &str,
    ) -> Result<Vec<Snippet>, RepositoryError>;

    /// `owner`'s snippets carrying `tag`, most recently updated first.
    async fn list_snippets_with_tag(
        &self,
        owner: UserId,
        tag: TagId,
    ) -> Result<Vec<Snippet>, RepositoryError>;
}

/// Tag persistence.
#[async_trait]
pub trait TagStore: Send + Sync {
    /// Atomically return the tag named `name`, creating it if needed.
    async fn find_or_create_tag(
        &self,
        name: &TagName,
        creator: UserId,
    ) -> Result<Tag, RepositoryError>;

    /// Get a tag by exact name.
    async fn get_tag_by_name(&self, name: &TagName) -> Result<Option<Tag>, RepositoryError>;

    /// Distinct tags attached to any of `owner`'s snippets, ordered by name.
    async fn list_tags_for_owner(&self, owner: UserId) -> Result<Vec<Tag>, RepositoryError>;

    /// Tags ranked by number of attached snippets across all users.
    async fn popular_tags(&self, limit: u32) -> Result<Vec<TagUsage>, RepositoryError>;

    /// Case-insensitive substring search over tag names.
    async fn search_tags(&self, query: &str, limit: u32) -> Result<Vec<Tag>, RepositoryError>;

    /// Whether `owner` has at least one snippet carrying `tag`.
    async fn owner_uses_tag(&self, owner: UserId, tag: TagId) -> Result<bool, RepositoryError>;

    /// Rename a tag.
    ///
    /// Returns `RepositoryError::NotFound` if the tag does not exist and
    /// `RepositoryError::Conflict` if another tag already has `name`.
    async fn rename_tag(&self, id: TagId, name: &TagName) -> Result<Tag, RepositoryError>;

    /// Delete a tag and all of its associations. Returns `false` if it did
    /// not exist.
    async fn delete_tag(&self, id: TagId) -> Result<bool, RepositoryError>;

    /// Detach `tag` from every snippet `owner` has, bumping their
    /// `updated_at`. Returns the number of snippets touched.
    async fn detach_tag_from_owner(&self, owner: UserId, tag: TagId)
    -> Result<u64, RepositoryError>;
}

/// Everything the service needs from persistence.
#[async_trait]
pub trait Store: UserStore + SnippetStore + TagStore {
    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

// =============================================================================
// Pool & Migrations
// =============================================================================

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply the schema migrations and create the session table.
///
/// # Errors
///
/// Returns `MigrationError` if either step fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    PostgresStore::new(pool.clone()).migrate().await?;
    Ok(())
}

/// Build a `LIKE` pattern matching `query` anywhere, with wildcards escaped.
///
/// Use with `ESCAPE '\'`.
#[must_use]
pub fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
