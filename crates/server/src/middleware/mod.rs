//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (records `x-request-id` on the span)
//! 4. Session layer (tower-sessions, signed cookie)
//!
//! Authentication is not a layer: handlers opt in with the [`RequireAuth`]
//! extractor.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{RequireAuth, clear_current_user, set_current_user};
pub use request_id::request_id_middleware;
pub use session::{SessionConfigError, cookie_name, create_session_layer};
