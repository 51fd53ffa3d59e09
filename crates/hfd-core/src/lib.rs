#![deny(missing_docs)]

//! # hfd-core — Resolution Core for HTML Fast Deploy
//!
//! HTML Fast Deploy serves operator-uploaded HTML applications under
//! `/apps/<name>/`. This crate holds the logic that decides what a request
//! below `/apps/` refers to, independent of HTTP and of the filesystem:
//!
//! - [`name`] — the application-name allow-list, [`AppName`].
//! - [`asset`] — normalized relative asset paths, [`AssetPath`].
//! - [`catalog`] — the [`AppCatalog`] read contract and application records.
//! - [`resolve`] — request path → [`Resolution`].
//! - [`referer`] — owning-application hint for bare asset requests.
//! - [`rewrite`] — root-relative → document-relative URL rewriting.
//! - [`mime`] — extension → content type.
//! - [`error`] — [`ValidationError`], [`CatalogError`], [`ResolveError`].
//!
//! Storage lives in `hfd-store`; HTTP in `hfd-api`.

pub mod asset;
pub mod catalog;
pub mod error;
pub mod mime;
pub mod name;
pub mod referer;
pub mod resolve;
pub mod rewrite;

pub use asset::AssetPath;
pub use catalog::{AppCatalog, AppForm, Application, INDEX_DOCUMENT};
pub use error::{CatalogError, ResolveError, ValidationError};
pub use mime::classify;
pub use name::{is_valid_name, AppName};
pub use referer::app_from_referer;
pub use resolve::{is_bare_asset_request, resolve, Resolution};
pub use rewrite::rewrite_document;
