//! # Admin Routes
//!
//! Operator-facing surface, mounted behind Basic authentication:
//!
//! - `GET /admin`: HTML dashboard listing applications with upload,
//!   replace and delete controls.
//! - `GET /admin/apps`: JSON list of applications.
//! - `POST /admin/apps`: multipart `app_name` + `html_file`, creates.
//! - `PUT /admin/apps/:name`: multipart `html_file`, replaces.
//! - `DELETE /admin/apps/:name`: deletes.
//!
//! Uploads ending in `.html`/`.htm` become single-file applications, `.zip`
//! bundles become directory applications.

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use hfd_core::{AppName, Application};
use hfd_store::Upload;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Operator;
use crate::error::AppError;
use crate::state::AppState;

// -- DTOs ---------------------------------------------------------------------

/// A deployed application as listed by the admin API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AppSummary {
    /// Application name.
    pub name: String,
    /// `single_file` or `directory`.
    pub form: String,
    /// Root document path relative to the apps root.
    pub root_document: String,
    /// Creation time of the root document.
    pub created_at: DateTime<Utc>,
    /// Public URL of the application.
    pub url: String,
}

impl From<Application> for AppSummary {
    fn from(app: Application) -> Self {
        Self {
            url: format!("/apps/{}/", app.name),
            name: app.name.to_string(),
            form: app.form.to_string(),
            root_document: app.root_document,
            created_at: app.created_at,
        }
    }
}

/// Result of a create or replace.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeployResponse {
    pub message: String,
    pub app_name: String,
    /// Form the application now exists in.
    pub form: String,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Multipart body of `POST /admin/apps`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct CreateAppForm {
    /// Application name, `^[A-Za-z0-9_-]+$`.
    app_name: String,
    /// `.html`, `.htm` or `.zip` file.
    #[schema(value_type = String, format = Binary)]
    html_file: Vec<u8>,
}

/// Multipart body of `PUT /admin/apps/{name}`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ReplaceAppForm {
    /// `.html`, `.htm` or `.zip` file.
    #[schema(value_type = String, format = Binary)]
    html_file: Vec<u8>,
}

// -- Router -------------------------------------------------------------------

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard))
        .route("/admin/apps", get(list_apps).post(create_app))
        .route("/admin/apps/:name", put(replace_app).delete(delete_app))
}

// -- Multipart parsing --------------------------------------------------------

#[derive(Default)]
struct UploadFields {
    app_name: Option<String>,
    file: Option<Upload>,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

async fn read_upload_fields(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadFields, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let mut fields = UploadFields::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some("app_name") => {
                fields.app_name = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("html_file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                fields.file = Some(Upload::new(filename, bytes.to_vec()));
            }
            _ => {}
        }
    }
    Ok(fields)
}

fn required_file(fields: &mut UploadFields) -> Result<Upload, AppError> {
    fields
        .file
        .take()
        .ok_or_else(|| AppError::BadRequest("missing multipart field: html_file".into()))
}

// -- Handlers -----------------------------------------------------------------

/// GET /admin/apps — List deployed applications, newest first.
#[utoipa::path(
    get,
    path = "/admin/apps",
    responses(
        (status = 200, description = "Deployed applications", body = Vec<AppSummary>),
        (status = 401, description = "Missing or invalid credentials", body = crate::error::ErrorBody),
    ),
    security(("basic_auth" = [])),
    tag = "admin"
)]
pub async fn list_apps(State(state): State<AppState>) -> Result<Json<Vec<AppSummary>>, AppError> {
    let apps = state.with_store(|store| Ok(store.list()?)).await?;
    Ok(Json(apps.into_iter().map(AppSummary::from).collect()))
}

/// POST /admin/apps — Deploy a new application.
#[utoipa::path(
    post,
    path = "/admin/apps",
    request_body(content = CreateAppForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Application created", body = DeployResponse),
        (status = 400, description = "Invalid name or malformed form", body = crate::error::ErrorBody),
        (status = 409, description = "Name already in use", body = crate::error::ErrorBody),
        (status = 413, description = "Upload or archive too large", body = crate::error::ErrorBody),
        (status = 422, description = "Unsupported file or archive without index.html", body = crate::error::ErrorBody),
    ),
    security(("basic_auth" = [])),
    tag = "admin"
)]
pub async fn create_app(
    State(state): State<AppState>,
    operator: Operator,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<DeployResponse>), AppError> {
    let mut fields = read_upload_fields(multipart).await?;
    let raw_name = fields
        .app_name
        .take()
        .ok_or_else(|| AppError::BadRequest("missing multipart field: app_name".into()))?;
    let name = AppName::parse(raw_name.trim())?;
    let upload = required_file(&mut fields)?;

    let app = {
        let name = name.clone();
        state
            .with_store(move |store| Ok(store.create(&name, &upload)?))
            .await?
    };
    tracing::info!(operator = %operator.username, app = %name, form = %app.form, "created application");

    Ok((
        StatusCode::CREATED,
        Json(DeployResponse {
            message: "application created".into(),
            app_name: name.to_string(),
            form: app.form.to_string(),
        }),
    ))
}

/// PUT /admin/apps/{name} — Replace an existing application.
#[utoipa::path(
    put,
    path = "/admin/apps/{name}",
    params(("name" = String, Path, description = "Application name")),
    request_body(content = ReplaceAppForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Application replaced", body = DeployResponse),
        (status = 400, description = "Invalid name or malformed form", body = crate::error::ErrorBody),
        (status = 404, description = "No such application", body = crate::error::ErrorBody),
        (status = 413, description = "Upload or archive too large", body = crate::error::ErrorBody),
        (status = 422, description = "Unsupported file or archive without index.html", body = crate::error::ErrorBody),
    ),
    security(("basic_auth" = [])),
    tag = "admin"
)]
pub async fn replace_app(
    State(state): State<AppState>,
    operator: Operator,
    Path(name): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DeployResponse>, AppError> {
    let name = AppName::parse(name)?;
    let mut fields = read_upload_fields(multipart).await?;
    let upload = required_file(&mut fields)?;

    let app = {
        let name = name.clone();
        state
            .with_store(move |store| Ok(store.replace(&name, &upload)?))
            .await?
    };
    tracing::info!(operator = %operator.username, app = %name, form = %app.form, "replaced application");

    Ok(Json(DeployResponse {
        message: "application updated".into(),
        app_name: name.to_string(),
        form: app.form.to_string(),
    }))
}

/// DELETE /admin/apps/{name} — Delete an application.
#[utoipa::path(
    delete,
    path = "/admin/apps/{name}",
    params(("name" = String, Path, description = "Application name")),
    responses(
        (status = 200, description = "Application deleted", body = MessageResponse),
        (status = 400, description = "Invalid name", body = crate::error::ErrorBody),
        (status = 404, description = "No such application", body = crate::error::ErrorBody),
    ),
    security(("basic_auth" = [])),
    tag = "admin"
)]
pub async fn delete_app(
    State(state): State<AppState>,
    operator: Operator,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let name = AppName::parse(name)?;
    {
        let name = name.clone();
        state
            .with_store(move |store| Ok(store.delete(&name)?))
            .await?;
    }
    tracing::info!(operator = %operator.username, app = %name, "deleted application");

    Ok(Json(MessageResponse {
        message: "application deleted".into(),
    }))
}

/// GET /admin — HTML dashboard.
async fn dashboard(
    State(state): State<AppState>,
    operator: Operator,
) -> Result<Html<String>, AppError> {
    let apps = state.with_store(|store| Ok(store.list()?)).await?;
    Ok(Html(render_dashboard(&operator.username, &apps).into_string()))
}

// -- Dashboard rendering ------------------------------------------------------

const DASHBOARD_SCRIPT: &str = r#"
async function send(method, url, body) {
  const res = await fetch(url, { method, body, credentials: 'same-origin' });
  const data = await res.json().catch(() => ({}));
  if (!res.ok) { alert((data.error && data.error.message) || res.statusText); return; }
  location.reload();
}
document.getElementById('create').addEventListener('submit', (e) => {
  e.preventDefault();
  send('POST', '/admin/apps', new FormData(e.target));
});
document.querySelectorAll('form.replace').forEach((f) => f.addEventListener('submit', (e) => {
  e.preventDefault();
  send('PUT', '/admin/apps/' + f.dataset.app, new FormData(f));
}));
document.querySelectorAll('button.delete').forEach((b) => b.addEventListener('click', () => {
  if (confirm('Delete ' + b.dataset.app + '?')) send('DELETE', '/admin/apps/' + b.dataset.app);
}));
"#;

fn render_dashboard(username: &str, apps: &[Application]) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "HTML Fast Deploy" }
            }
            body {
                h1 { "HTML Fast Deploy" }
                p { "Signed in as " (username) }
                form id="create" {
                    input name="app_name" placeholder="app name" pattern="[A-Za-z0-9_-]+" required;
                    input type="file" name="html_file" accept=".html,.htm,.zip" required;
                    button { "Deploy" }
                }
                table {
                    tr {
                        th { "Name" }
                        th { "Form" }
                        th { "Created" }
                        th {}
                        th {}
                    }
                    @for app in apps {
                        tr {
                            td { a href=(format!("/apps/{}/", app.name)) { (app.name) } }
                            td { (app.form) }
                            td { (app.created_at.format("%Y-%m-%d %H:%M:%S UTC")) }
                            td {
                                form class="replace" data-app=(app.name) {
                                    input type="file" name="html_file" accept=".html,.htm,.zip" required;
                                    button { "Replace" }
                                }
                            }
                            td { button class="delete" data-app=(app.name) { "Delete" } }
                        }
                    }
                    @if apps.is_empty() {
                        tr { td colspan="5" { "No applications deployed yet." } }
                    }
                }
                script { (PreEscaped(DASHBOARD_SCRIPT)) }
            }
        }
    }
}
