//! Edge gate rejecting unauthenticated mutations to protected paths.
//!
//! This is a presence-only check: the request must carry a syntactically
//! valid bearer header, but the token itself is not decoded here. A present
//! but invalid or expired token passes the gate and is caught by the deep
//! check at `/api/auth/verify`, which privileged flows call on entry.

use axum::{
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

use super::handlers::bearer_token;

/// Path prefixes whose mutations require a bearer header.
const PROTECTED_PREFIXES: &[&str] = &["/api/holiday", "/admin"];

fn is_protected_path(path: &str) -> bool {
    PROTECTED_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

fn is_mutation(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::DELETE)
}

/// Middleware applied to the whole router; pure predicate per request, no
/// state.
pub async fn require_bearer(request: Request, next: Next) -> Response {
    if is_protected_path(request.uri().path())
        && is_mutation(request.method())
        && bearer_token(request.headers()).is_none()
    {
        debug!(
            "Rejected unauthenticated {} {}",
            request.method(),
            request.uri().path()
        );
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Authentication required" })),
        )
            .into_response();
    }

    next.run(request).await
}
