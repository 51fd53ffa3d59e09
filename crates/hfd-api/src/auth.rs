//! # Authentication Middleware
//!
//! HTTP Basic authentication for the admin surface.
//!
//! ```text
//! Authorization: Basic base64(username:password)
//! ```
//!
//! Credentials come from [`CredentialTable`], built once from configuration.
//! Passwords are compared in constant time, and an unknown username still
//! costs one password comparison. Every authenticated request gets an
//! [`Operator`] injected into the request extensions; handlers extract it
//! via the `FromRequestParts` impl.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::headers::authorization::Basic;
use axum_extra::headers::{Authorization, HeaderMapExt};
use subtle::ConstantTimeEq;

use crate::error::AppError;

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin123";

// ── Operator ────────────────────────────────────────────────────────────────

/// The authenticated admin user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub username: String,
}

/// Extracts the operator the auth middleware injected into extensions.
/// Returns 401 if none is present.
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for Operator {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Operator>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no operator in request context".into()))
    }
}

// ── Credentials ─────────────────────────────────────────────────────────────

/// One configured operator login.
///
/// Custom `Debug` redacts the password.
#[derive(Clone)]
pub struct Credential {
    username: String,
    password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Immutable set of operator logins, cheap to clone into request extensions.
#[derive(Debug, Clone)]
pub struct CredentialTable {
    entries: Arc<Vec<Credential>>,
}

impl CredentialTable {
    pub fn new(entries: Vec<Credential>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }

    /// The single built-in `admin` operator used when nothing is configured.
    pub fn default_operator() -> Self {
        Self::new(vec![Credential::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)])
    }

    /// Configured usernames, in configuration order.
    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Credential::username)
    }

    /// Check a username/password pair.
    pub fn verify(&self, username: &str, password: &str) -> Option<Operator> {
        let entry = self
            .entries
            .iter()
            .find(|c| constant_time_eq(username, &c.username));
        match entry {
            Some(c) if constant_time_eq(password, &c.password) => Some(Operator {
                username: c.username.clone(),
            }),
            Some(_) => None,
            None => {
                // Same work as a known user with a wrong password.
                let _ = constant_time_eq(password, DEFAULT_PASSWORD);
                None
            }
        }
    }
}

/// Constant-time string comparison. Lengths that differ still cost one
/// comparison.
fn constant_time_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Decode the `Authorization: Basic` header into `(username, password)`.
///
/// `Ok(None)` when the header is absent.
pub fn basic_credentials(headers: &HeaderMap) -> Result<Option<(String, String)>, String> {
    match headers.typed_try_get::<Authorization<Basic>>() {
        Ok(Some(Authorization(basic))) => {
            Ok(Some((basic.username().to_string(), basic.password().to_string())))
        }
        Ok(None) => Ok(None),
        Err(_) => Err("authorization header must use the Basic scheme".into()),
    }
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Authenticate the request against the [`CredentialTable`] in extensions
/// and inject the resulting [`Operator`].
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let Some(table) = request.extensions().get::<CredentialTable>().cloned() else {
        tracing::error!("credential table missing from request extensions");
        return AppError::Internal("authentication is not configured".into()).into_response();
    };

    let credentials = match basic_credentials(request.headers()) {
        Ok(Some(credentials)) => credentials,
        Ok(None) => {
            tracing::debug!("authentication required: missing authorization header");
            return AppError::Unauthorized("missing authorization header".into()).into_response();
        }
        Err(msg) => {
            tracing::warn!(reason = %msg, "authentication failed");
            return AppError::Unauthorized(msg).into_response();
        }
    };

    let (username, password) = credentials;
    match table.verify(&username, &password) {
        Some(operator) => {
            tracing::debug!(operator = %operator.username, "authenticated");
            request.extensions_mut().insert(operator);
            next.run(request).await
        }
        None => {
            tracing::warn!(username = %username, "authentication failed: invalid credentials");
            AppError::Unauthorized("invalid credentials".into()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::HeaderValue;
    use axum::http::{header, Request, StatusCode};
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn basic(user: &str, pass: &str) -> HeaderValue {
        let mut headers = HeaderMap::new();
        headers.typed_insert(Authorization::basic(user, pass));
        headers.remove(header::AUTHORIZATION).unwrap()
    }

    fn with_authorization(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn test_app() -> Router {
        let table = CredentialTable::new(vec![
            Credential::new("alice", "wonderland"),
            Credential::new("bob", "builder"),
        ]);
        Router::new()
            .route("/test", get(|op: Operator| async move { op.username }))
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(table))
    }

    #[test]
    fn verify_accepts_only_matching_pairs() {
        let table = CredentialTable::default_operator();
        assert_eq!(
            table.verify("admin", "admin123"),
            Some(Operator {
                username: "admin".into()
            })
        );
        assert!(table.verify("admin", "admin1234").is_none());
        assert!(table.verify("Admin", "admin123").is_none());
        assert!(table.verify("nobody", "admin123").is_none());
        assert_eq!(table.usernames().collect::<Vec<_>>(), ["admin"]);
    }

    #[test]
    fn basic_credentials_handle_colons_in_password() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, basic("alice", "a:b:c"));
        let (user, pass) = basic_credentials(&headers).unwrap().unwrap();
        assert_eq!(user, "alice");
        assert_eq!(pass, "a:b:c");
    }

    #[test]
    fn basic_credentials_absent_or_malformed() {
        assert_eq!(basic_credentials(&HeaderMap::new()), Ok(None));
        assert!(basic_credentials(&with_authorization("Bearer token")).is_err());
        assert!(basic_credentials(&with_authorization("Basic !!!")).is_err());
        assert!(basic_credentials(&with_authorization("Basic")).is_err());
    }

    #[test]
    fn credential_debug_is_redacted() {
        let debug = format!("{:?}", Credential::new("alice", "s3cret-pass"));
        assert!(debug.contains("alice"));
        assert!(!debug.contains("s3cret-pass"));
    }

    #[tokio::test]
    async fn valid_credentials_inject_operator() {
        let request = Request::builder()
            .uri("/test")
            .header("Authorization", basic("bob", "builder"))
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"bob");
    }

    #[tokio::test]
    async fn missing_header_is_challenged() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(err["error"]["code"], "UNAUTHORIZED");
        assert!(err["error"]["message"].as_str().unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn wrong_password_rejected() {
        let request = Request::builder()
            .uri("/test")
            .header("Authorization", basic("alice", "looking-glass"))
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bearer_scheme_rejected() {
        let request = Request::builder()
            .uri("/test")
            .header("Authorization", "Bearer wonderland")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(err["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Basic scheme"));
    }
}
