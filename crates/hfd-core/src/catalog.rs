//! # Application Catalog
//!
//! The read-side contract the resolver needs from the application store,
//! and the record types the store hands out.
//!
//! An application exists in exactly one of two forms:
//!
//! ```text
//! <apps root>/<name>.html              SingleFile
//! <apps root>/<name>/index.html        Directory (plus sibling assets)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::asset::AssetPath;
use crate::error::CatalogError;
use crate::name::AppName;

/// File name of a directory-form application's root document.
pub const INDEX_DOCUMENT: &str = "index.html";

/// On-disk form of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppForm {
    /// `<name>.html`, served verbatim. Has no assets.
    SingleFile,
    /// `<name>/index.html` plus assets; the root document is rewritten.
    Directory,
}

impl AppForm {
    /// Return the string representation of this form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleFile => "single_file",
            Self::Directory => "directory",
        }
    }

    /// Root document path relative to the apps root.
    pub fn root_document(&self, name: &AppName) -> String {
        match self {
            Self::SingleFile => name.single_file_name(),
            Self::Directory => format!("{name}/{INDEX_DOCUMENT}"),
        }
    }
}

impl std::fmt::Display for AppForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deployed application as listed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Unique, case-sensitive name.
    pub name: AppName,
    /// Current on-disk form.
    pub form: AppForm,
    /// Root document path relative to the apps root.
    pub root_document: String,
    /// Creation (or, where unavailable, modification) time of the root
    /// document. Only used for display ordering.
    pub created_at: DateTime<Utc>,
}

/// Read access to deployed applications, as needed by the resolver.
pub trait AppCatalog {
    /// Which form `app` currently exists in, if any.
    ///
    /// Must fail with [`CatalogError::AmbiguousForm`] when both forms exist.
    fn form(&self, app: &AppName) -> Result<Option<AppForm>, CatalogError>;

    /// Whether `asset` names a regular file inside the directory of `app`.
    fn has_asset(&self, app: &AppName, asset: &AssetPath) -> bool;
}

impl<C: AppCatalog + ?Sized> AppCatalog for &C {
    fn form(&self, app: &AppName) -> Result<Option<AppForm>, CatalogError> {
        (**self).form(app)
    }

    fn has_asset(&self, app: &AppName, asset: &AssetPath) -> bool {
        (**self).has_asset(app, asset)
    }
}
