//! Signup and login: the only place tokens are minted.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, response::Response, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

use crate::auth::{
    password,
    store::{self, CreateOutcome, IdentitySummary},
    token::TokenService,
};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AuthRequest {
    /// `signup` or `login`.
    #[serde(rename = "type")]
    pub mode: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub identity: IdentitySummary,
}

/// A structurally valid authentication attempt.
#[derive(Debug, PartialEq, Eq)]
enum AuthAttempt {
    Signup {
        name: String,
        email: String,
        password: String,
    },
    Login {
        email: String,
        password: String,
    },
}

#[derive(Debug, PartialEq, Eq)]
enum AuthReject {
    MissingFields,
    InvalidType,
}

fn non_empty(field: Option<&String>) -> Option<&str> {
    field.map(String::as_str).filter(|value| !value.is_empty())
}

/// Check required fields per mode. Signup additionally requires a name.
fn validate(request: &AuthRequest) -> Result<AuthAttempt, AuthReject> {
    let mode = non_empty(request.mode.as_ref()).ok_or(AuthReject::MissingFields)?;
    let email = non_empty(request.email.as_ref()).ok_or(AuthReject::MissingFields)?;
    let password = non_empty(request.password.as_ref()).ok_or(AuthReject::MissingFields)?;

    match mode {
        "signup" => {
            let name = non_empty(request.name.as_ref()).ok_or(AuthReject::MissingFields)?;
            Ok(AuthAttempt::Signup {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
        }
        "login" => Ok(AuthAttempt::Login {
            email: email.to_string(),
            password: password.to_string(),
        }),
        _ => Err(AuthReject::InvalidType),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn internal_error() -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

#[utoipa::path(
    get,
    path = "/api/auth",
    responses(
        (status = 200, description = "Auth route is active", content_type = "application/json"),
    ),
    tag = "auth"
)]
pub async fn auth_status() -> impl IntoResponse {
    Json(json!({ "message": "Auth route active" }))
}

#[utoipa::path(
    post,
    path = "/api/auth",
    request_body = AuthRequest,
    responses(
        (status = 201, description = "Signup successful", body = AuthResponse, content_type = "application/json"),
        (status = 200, description = "Login successful", body = AuthResponse, content_type = "application/json"),
        (status = 400, description = "Missing fields, duplicate email, or unknown request type"),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "auth"
)]
#[instrument(skip(pool, tokens, payload))]
pub async fn authenticate(
    Extension(pool): Extension<PgPool>,
    Extension(tokens): Extension<Arc<TokenService>>,
    payload: Option<Json<AuthRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Missing required fields");
    };

    let attempt = match validate(&request) {
        Ok(attempt) => attempt,
        Err(AuthReject::MissingFields) => {
            return error_response(StatusCode::BAD_REQUEST, "Missing required fields");
        }
        Err(AuthReject::InvalidType) => {
            return error_response(StatusCode::BAD_REQUEST, "Invalid request type");
        }
    };

    match attempt {
        AuthAttempt::Signup {
            name,
            email,
            password,
        } => signup(&pool, &tokens, &name, &email, &password).await,
        AuthAttempt::Login { email, password } => login(&pool, &tokens, &email, &password).await,
    }
}

async fn signup(
    pool: &PgPool,
    tokens: &TokenService,
    name: &str,
    email: &str,
    password: &str,
) -> Response {
    let password_hash = match password::hash(password) {
        Ok(hash) => hash,
        Err(err) => {
            error!("Failed to hash password: {err:#}");
            return internal_error();
        }
    };

    // No existence pre-check: the unique index on email is the only arbiter,
    // so concurrent signups with the same email cannot both succeed.
    let identity = match store::create(pool, name, email, &password_hash).await {
        Ok(CreateOutcome::Created(identity)) => identity,
        Ok(CreateOutcome::Duplicate) => {
            debug!("Signup rejected: email already registered");
            return error_response(StatusCode::BAD_REQUEST, "User already exists");
        }
        Err(err) => {
            error!("Failed to create identity: {err:#}");
            return internal_error();
        }
    };

    match tokens.issue(identity.id, Utc::now().timestamp()) {
        Ok(token) => (
            StatusCode::CREATED,
            Json(AuthResponse {
                message: "Signup successful".to_string(),
                token,
                identity: identity.summary(),
            }),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to issue token: {err}");
            internal_error()
        }
    }
}

async fn login(pool: &PgPool, tokens: &TokenService, email: &str, password: &str) -> Response {
    let record = match store::find_by_email(pool, email).await {
        Ok(record) => record,
        Err(err) => {
            error!("Failed to lookup identity: {err:#}");
            return internal_error();
        }
    };

    // Unknown email and wrong password share one answer so the response does
    // not reveal which check failed.
    let matched = match &record {
        Some(record) => password::verify(password, &record.password_hash).unwrap_or(false),
        None => false,
    };
    let Some(record) = record.filter(|_| matched) else {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid credentials");
    };

    match tokens.issue(record.id, Utc::now().timestamp()) {
        Ok(token) => (
            StatusCode::OK,
            Json(AuthResponse {
                message: "Login successful".to_string(),
                token,
                identity: record.summary(),
            }),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to issue token: {err}");
            internal_error()
        }
    }
}
