pub mod auth;
pub mod health;
pub mod holiday;
pub mod verify;

pub use self::health::health;

// common functions for the handlers
use axum::http::{header::AUTHORIZATION, HeaderMap};

/// Extract the token from a bearer-scheme authorization header.
///
/// Returns `None` when the header is absent, unreadable, carries a different
/// scheme, or has nothing after the scheme marker.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
