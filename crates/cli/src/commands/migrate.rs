//! Database migration command.
//!
//! Applies the SQL migrations in `crates/server/migrations/` and then creates
//! the tower-sessions table. Safe to run repeatedly.

use super::connect;

/// Run all migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    reusify_server::db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
