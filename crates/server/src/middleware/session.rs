//! Session middleware configuration.
//!
//! Sessions are stored server-side (`PostgreSQL` in production, memory in
//! tests) and identified by a signed cookie.

use secrecy::ExposeSecret;
use tower_sessions::cookie::{Key, SameSite, time::Duration};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::ServerConfig;

/// Session cookie name over plain HTTP.
pub const SESSION_COOKIE_NAME: &str = "reusify.session_token";

/// Session cookie name over HTTPS.
pub const SECURE_SESSION_COOKIE_NAME: &str = "__Secure-reusify.session_token";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Error building the session layer.
#[derive(Debug, thiserror::Error)]
pub enum SessionConfigError {
    #[error("session secret cannot be used as a signing key: {0}")]
    InvalidKey(#[from] tower_sessions::cookie::KeyError),
}

/// The cookie name for the configured environment.
///
/// The `__Secure-` prefix requires the `Secure` attribute, so it is only
/// used when the site is served over HTTPS.
#[must_use]
pub const fn cookie_name(is_production: bool) -> &'static str {
    if is_production {
        SECURE_SESSION_COOKIE_NAME
    } else {
        SESSION_COOKIE_NAME
    }
}

/// Create the session layer over any session store.
///
/// # Arguments
///
/// * `store` - Session store (`PostgresStore` in production)
/// * `config` - Server configuration (for session secret and base URL)
///
/// # Errors
///
/// Returns `SessionConfigError::InvalidKey` if the session secret is shorter
/// than a signing key.
pub fn create_session_layer<S: SessionStore>(
    store: S,
    config: &ServerConfig,
) -> Result<SessionManagerLayer<S, SignedCookie>, SessionConfigError> {
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes())?;
    let is_secure = config.is_production();

    Ok(SessionManagerLayer::new(store)
        .with_name(cookie_name(is_secure))
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            SESSION_EXPIRY_SECONDS,
        )))
        .with_secure(is_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_name_follows_environment() {
        assert_eq!(cookie_name(false), "reusify.session_token");
        assert_eq!(cookie_name(true), "__Secure-reusify.session_token");
    }
}
