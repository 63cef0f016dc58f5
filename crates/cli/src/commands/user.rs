//! User management commands.

use reusify_server::services::AuthService;

use super::store;

/// Create a new user with a password login.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns an error if the name, email or password is rejected, the email is
/// already registered, or the database is unreachable.
pub async fn create(
    name: &str,
    email: &str,
    password: &str,
) -> Result<i32, Box<dyn std::error::Error>> {
    let store = store().await?;

    tracing::info!("Creating user: {}", email);
    let user = AuthService::new(&store)
        .register(name, email, password)
        .await?;

    tracing::info!(id = %user.id, "User created");
    Ok(user.id.as_i32())
}
