use crate::api::APP_USER_AGENT;
use crate::auth::store::IdentitySummary;
use crate::client::guard::VerifyEndpoint;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AuthBody {
    #[allow(dead_code)]
    message: String,
    token: String,
    identity: IdentitySummary,
}

#[derive(Debug, Deserialize)]
struct VerifyBody {
    #[allow(dead_code)]
    message: String,
    identity: IdentitySummary,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// A session as returned by a successful signup or login.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub token: String,
    pub identity: IdentitySummary,
}

/// HTTP client for the API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Build a client for the API at `base_url`, e.g. `http://localhost:8080`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .context("could not build HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Create an account and get a session for it.
    ///
    /// # Errors
    ///
    /// Returns an error when the server rejects the request, carrying the
    /// server's error message.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<AuthOutcome> {
        self.authenticate(serde_json::json!({
            "type": "signup",
            "name": name,
            "email": email,
            "password": password,
        }))
        .await
    }

    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns an error when the server rejects the credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthOutcome> {
        self.authenticate(serde_json::json!({
            "type": "login",
            "email": email,
            "password": password,
        }))
        .await
    }

    async fn authenticate(&self, payload: serde_json::Value) -> Result<AuthOutcome> {
        let response = self
            .http
            .post(format!("{}/api/auth", self.base_url))
            .json(&payload)
            .send()
            .await
            .context("auth request failed")?;

        // Signup answers 201, login 200; any success carries an AuthBody.
        if response.status().is_success() {
            let body: AuthBody = response.json().await.context("malformed auth response")?;
            return Ok(AuthOutcome {
                token: body.token,
                identity: body.identity,
            });
        }

        Err(anyhow!(read_error(response).await))
    }
}

impl VerifyEndpoint for ApiClient {
    async fn verify(&self, token: &str) -> Result<IdentitySummary> {
        let response = self
            .http
            .post(format!("{}/api/auth/verify", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .context("verify request failed")?;

        if response.status().is_success() {
            let body: VerifyBody = response.json().await.context("malformed verify response")?;
            return Ok(body.identity);
        }

        Err(anyhow!(read_error(response).await))
    }
}

async fn read_error(response: reqwest::Response) -> String {
    let status = response.status();

    match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => format!("unexpected response: {status}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::json;
    use tokio::net::TcpListener;
    use uuid::Uuid;

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service()).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn identity_json(id: Uuid) -> serde_json::Value {
        json!({ "id": id, "name": "Fabio", "email": "fabio@example.com" })
    }

    #[tokio::test]
    async fn signup_accepts_created_response() {
        let id = Uuid::new_v4();
        let app = Router::new().route(
            "/api/auth",
            post(move || async move {
                (
                    StatusCode::CREATED,
                    Json(json!({
                        "message": "Signup successful",
                        "token": "header.claims.signature",
                        "identity": identity_json(id),
                    })),
                )
            }),
        );

        let client = ApiClient::new(serve(app).await).unwrap();
        let outcome = client
            .signup("Fabio", "fabio@example.com", "secret")
            .await
            .unwrap();

        assert_eq!(outcome.token, "header.claims.signature");
        assert_eq!(outcome.identity.id, id);
    }

    #[tokio::test]
    async fn login_accepts_ok_response() {
        let id = Uuid::new_v4();
        let app = Router::new().route(
            "/api/auth",
            post(move || async move {
                Json(json!({
                    "message": "Login successful",
                    "token": "header.claims.signature",
                    "identity": identity_json(id),
                }))
            }),
        );

        let client = ApiClient::new(serve(app).await).unwrap();
        let outcome = client.login("fabio@example.com", "secret").await.unwrap();

        assert_eq!(outcome.identity.email, "fabio@example.com");
    }

    #[tokio::test]
    async fn auth_failure_surfaces_server_error_message() {
        let app = Router::new().route(
            "/api/auth",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": "Invalid credentials" })),
                )
            }),
        );

        let client = ApiClient::new(serve(app).await).unwrap();
        let err = client
            .login("fabio@example.com", "wrong")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid credentials");
    }
}
