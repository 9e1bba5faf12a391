use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware,
    routing::{delete, get, post},
    Router,
};
use feritago::api::gate;
use tower::ServiceExt;

async fn ok() -> &'static str {
    "ok"
}

fn app() -> Router {
    Router::new()
        .route("/api/holiday", get(ok).post(ok))
        .route("/api/holiday/:id", delete(ok).put(ok))
        .route("/api/auth", post(ok))
        .layer(middleware::from_fn(gate::require_bearer))
}

#[tokio::test]
async fn mutation_without_token_is_rejected() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/holiday")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({"error": "Authentication required"}));
}

#[tokio::test]
async fn delete_without_token_is_rejected() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/holiday/0d2a9f35-9e21-4f7b-a0d9-c6a1f6c3f001")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reads_pass_without_token() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/holiday")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn gate_checks_presence_not_validity() {
    // The gate only requires a bearer header; signature and expiry checks
    // belong to the verify endpoint.
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/holiday")
                .header(header::AUTHORIZATION, "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_endpoint_is_not_gated() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
