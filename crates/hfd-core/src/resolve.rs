//! # Request Path Resolution
//!
//! Maps the path below `/apps/` to a root document or to an asset of one
//! specific application.
//!
//! ## Branches
//!
//! **Bare asset request**: the final segment contains a `.` and does not end
//! in `.html` (`style.css`, `img/logo.png`, `foo/style.css`).
//!
//! 1. If the referer names an existing directory-form application, look for
//!    the path inside it, with a leading `<app>/` stripped if present.
//! 2. Otherwise, if the first segment names an existing directory-form
//!    application and the remainder is one of its files, serve that.
//! 3. Otherwise `NotFound`. There is no search across applications.
//!
//! **Application request**: anything else. The first segment is the
//! application name and must be valid.
//!
//! - Directory form: empty remainder, `/` or `index.html` → root document;
//!   otherwise the remainder (or the remainder minus a repeated `<app>/`)
//!   must be one of its files.
//! - Single-file form → root document.
//! - Neither → `NotFound`.
//!
//! Malformed remainders (`docs/`, `a//b`) name no file and are `NotFound`;
//! only paths that try to leave the directory (`..`, backslash, NUL) are
//! `BadRequest`.
//!
//! A name found in both forms fails closed via
//! [`CatalogError::AmbiguousForm`](crate::CatalogError::AmbiguousForm).

use crate::asset::{escapes_directory, AssetPath};
use crate::catalog::{AppCatalog, AppForm, INDEX_DOCUMENT};
use crate::error::{ResolveError, ValidationError};
use crate::name::AppName;
use crate::referer::app_from_referer;

/// Successful resolution of an `/apps/*` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Serve the application's root document.
    RootDocument {
        /// Owning application.
        app: AppName,
        /// Form the application was found in; decides whether to rewrite.
        form: AppForm,
    },
    /// Serve a static file from the application's directory.
    Asset {
        /// Owning application.
        app: AppName,
        /// Path relative to the application directory.
        path: AssetPath,
    },
}

/// Whether `path` looks like a static-asset request rather than a document.
pub fn is_bare_asset_request(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or(path);
    last.contains('.') && !last.ends_with(".html")
}

/// Resolve the part of a request path below `/apps/`.
///
/// `referer` is the raw Referer header value, if the request carried one.
pub fn resolve<C: AppCatalog + ?Sized>(
    catalog: &C,
    path: &str,
    referer: Option<&str>,
) -> Result<Resolution, ResolveError> {
    let path = path.trim_start_matches('/');
    if is_bare_asset_request(path) {
        resolve_bare_asset(catalog, path, referer)
    } else {
        resolve_application(catalog, path)
    }
}

fn resolve_bare_asset<C: AppCatalog + ?Sized>(
    catalog: &C,
    path: &str,
    referer: Option<&str>,
) -> Result<Resolution, ResolveError> {
    let asset = parse_asset(path, || format!("asset {path}"))?;

    if let Some(owner) = referer.and_then(app_from_referer) {
        if catalog.form(&owner)? == Some(AppForm::Directory) {
            let candidate = asset.strip_app_prefix(&owner).unwrap_or_else(|| asset.clone());
            if catalog.has_asset(&owner, &candidate) {
                return Ok(Resolution::Asset {
                    app: owner,
                    path: candidate,
                });
            }
        }
    }

    if let Some((first, rest)) = asset.split_first() {
        if let Ok(app) = AppName::parse(first) {
            if catalog.form(&app)? == Some(AppForm::Directory) && catalog.has_asset(&app, &rest) {
                return Ok(Resolution::Asset { app, path: rest });
            }
        }
    }

    Err(ResolveError::NotFound(format!("asset {path}")))
}

fn resolve_application<C: AppCatalog + ?Sized>(
    catalog: &C,
    path: &str,
) -> Result<Resolution, ResolveError> {
    let (first, rest) = path.split_once('/').unwrap_or((path, ""));
    let app = AppName::parse(first)?;

    match catalog.form(&app)? {
        Some(AppForm::Directory) => {
            let root = || {
                Ok(Resolution::RootDocument {
                    app: app.clone(),
                    form: AppForm::Directory,
                })
            };
            if rest.is_empty() || rest == "/" {
                return root();
            }
            let asset = parse_asset(rest, || format!("{app}/{rest}"))?;
            if asset.as_str() == INDEX_DOCUMENT {
                return root();
            }
            if catalog.has_asset(&app, &asset) {
                return Ok(Resolution::Asset { app, path: asset });
            }
            if let Some(stripped) = asset.strip_app_prefix(&app) {
                if stripped.as_str() == INDEX_DOCUMENT {
                    return root();
                }
                if catalog.has_asset(&app, &stripped) {
                    return Ok(Resolution::Asset {
                        app,
                        path: stripped,
                    });
                }
            }
            Err(ResolveError::NotFound(format!("{app}/{asset}")))
        }
        Some(AppForm::SingleFile) => Ok(Resolution::RootDocument {
            app,
            form: AppForm::SingleFile,
        }),
        None => Err(ResolveError::NotFound(format!("application {app}"))),
    }
}

/// Parse a request-derived asset path. Escapes are rejected; any other
/// malformed path simply names no file.
fn parse_asset(raw: &str, what: impl FnOnce() -> String) -> Result<AssetPath, ResolveError> {
    AssetPath::parse(raw).map_err(|err: ValidationError| {
        if escapes_directory(&err) {
            ResolveError::BadRequest(err)
        } else {
            ResolveError::NotFound(what())
        }
    })
}
