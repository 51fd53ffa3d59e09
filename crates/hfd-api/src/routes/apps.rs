//! # Public Application Serving
//!
//! `GET /apps/*path` serves deployed applications without authentication.
//! The request path is resolved by [`hfd_core::resolve`] against the store:
//! root documents are served as `text/html` (rewritten for directory-form
//! applications), assets with a content type classified from their file
//! name. The `Referer` header is only a lookup hint for bare asset requests.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use hfd_core::mime::HTML_DOCUMENT;
use hfd_core::{classify, resolve, Resolution};

use crate::error::AppError;
use crate::state::AppState;

/// Build the public serving router.
pub fn router() -> Router<AppState> {
    Router::new().route("/apps/*path", get(serve))
}

/// What a resolved request turned into.
enum Served {
    Document(Vec<u8>),
    Asset {
        content_type: &'static str,
        bytes: Vec<u8>,
    },
}

impl IntoResponse for Served {
    fn into_response(self) -> Response {
        match self {
            Self::Document(bytes) => ([(header::CONTENT_TYPE, HTML_DOCUMENT)], bytes).into_response(),
            Self::Asset {
                content_type,
                bytes,
            } => ([(header::CONTENT_TYPE, content_type)], bytes).into_response(),
        }
    }
}

/// GET /apps/*path — Serve a root document or an asset.
async fn serve(
    State(state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Served, AppError> {
    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    state
        .with_store(move |store| {
            let resolution = resolve(store, &path, referer.as_deref())?;
            tracing::debug!(%path, ?resolution, "resolved application request");
            match resolution {
                Resolution::RootDocument { app, .. } => {
                    let document = store.read_root_document(&app)?;
                    Ok(Served::Document(document.into_served_bytes()))
                }
                Resolution::Asset { app, path } => {
                    let bytes = store.read_asset(&app, &path)?;
                    Ok(Served::Asset {
                        content_type: classify(path.as_str()),
                        bytes,
                    })
                }
            }
        })
        .await
}
