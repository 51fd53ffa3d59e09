//! # Error Hierarchy
//!
//! Structured error types for the resolution core, built with `thiserror`.
//!
//! - [`ValidationError`] — a request-derived value (application name, asset
//!   path) was rejected before any storage access.
//! - [`CatalogError`] — the application catalog could not answer a lookup.
//! - [`ResolveError`] — terminal outcome of a failed path resolution.
//!
//! None of these are retried; every error is final for the request that
//! produced it.

use thiserror::Error;

/// Validation errors for request-derived values.
///
/// Raised before any filesystem path is built from the value, so a rejected
/// name or path never reaches storage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Application name is empty or contains characters outside `[A-Za-z0-9_-]`.
    #[error("invalid application name: {0:?} (only ASCII letters, digits, '_' and '-' are allowed)")]
    InvalidName(String),

    /// Asset path is absolute, escapes its application directory, or is malformed.
    #[error("invalid asset path: {path:?} ({reason})")]
    InvalidAssetPath {
        /// The rejected path as received.
        path: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// Errors raised by an [`AppCatalog`](crate::AppCatalog) lookup.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Both `<name>.html` and `<name>/index.html` exist. The store invariant
    /// says the forms are exclusive, so the lookup fails closed.
    #[error("application {0:?} exists in both single-file and directory form")]
    AmbiguousForm(String),

    /// Underlying storage failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why an `/apps/*` request path could not be resolved.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The path carried an invalid application name or asset path.
    #[error(transparent)]
    BadRequest(#[from] ValidationError),

    /// No application or asset matches the path (including an absent or
    /// unusable referer hint for a bare asset request).
    #[error("not found: {0}")]
    NotFound(String),

    /// The catalog failed to answer, or found the application in an
    /// inconsistent state.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
