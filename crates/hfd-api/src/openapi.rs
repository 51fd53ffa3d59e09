//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented admin routes into a single OpenAPI document
//! served at `/openapi.json` (behind the same authentication as the admin
//! API it describes).

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Assembled OpenAPI document for the admin API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "HTML Fast Deploy Admin API",
        version = "0.1.0",
        description = "Deploy, replace and delete HTML applications served under /apps/.",
        license(name = "MIT")
    ),
    paths(
        crate::routes::admin::list_apps,
        crate::routes::admin::create_app,
        crate::routes::admin::replace_app,
        crate::routes::admin::delete_app,
    ),
    components(schemas(
        crate::routes::admin::AppSummary,
        crate::routes::admin::DeployResponse,
        crate::routes::admin::MessageResponse,
        crate::routes::admin::CreateAppForm,
        crate::routes::admin::ReplaceAppForm,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    modifiers(&BasicAuthScheme),
    tags(
        (name = "admin", description = "Application management"),
    )
)]
pub struct ApiDoc;

/// Registers the `basic_auth` security scheme referenced by the paths.
struct BasicAuthScheme;

impl Modify for BasicAuthScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI document.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_covers_admin_paths() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        assert!(doc["paths"]["/admin/apps"]["get"].is_object());
        assert!(doc["paths"]["/admin/apps"]["post"].is_object());
        assert!(doc["paths"]["/admin/apps/{name}"]["put"].is_object());
        assert!(doc["paths"]["/admin/apps/{name}"]["delete"].is_object());
        assert_eq!(
            doc["components"]["securitySchemes"]["basic_auth"]["scheme"],
            "basic"
        );
    }
}
