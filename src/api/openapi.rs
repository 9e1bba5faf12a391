use axum::Json;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::api::handlers::{auth, holiday, verify};

/// Registers the bearer scheme referenced by the protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health,
        crate::api::handlers::auth::auth_status,
        crate::api::handlers::auth::authenticate,
        crate::api::handlers::verify::verify,
        crate::api::handlers::holiday::list,
        crate::api::handlers::holiday::create,
        crate::api::handlers::holiday::update,
        crate::api::handlers::holiday::remove,
    ),
    components(schemas(
        auth::AuthRequest,
        auth::AuthResponse,
        verify::VerifyResponse,
        crate::auth::store::IdentitySummary,
        holiday::Holiday,
        holiday::HolidayPayload,
        holiday::HolidayKind,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Signup, login, and token verification"),
        (name = "holiday", description = "Public holiday catalog"),
        (name = "health", description = "Service health"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// axum handler serving the document at `/openapi.json`.
pub async fn serve() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi())
}
