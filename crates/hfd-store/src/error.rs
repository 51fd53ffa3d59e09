//! # Store Error Types
//!
//! Every store operation returns [`StoreError`]. Upload problems
//! (unsupported file type, archive without `index.html`, unsafe or oversized
//! archive) are detected while staging, before anything visible changes.

use hfd_core::CatalogError;
use thiserror::Error;

/// Errors from the application store and its publication operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No application with this name exists in either form.
    #[error("application not found: {0}")]
    NotFound(String),

    /// The application exists but the requested asset does not.
    #[error("asset not found: {app}/{path}")]
    AssetNotFound { app: String, path: String },

    /// Create was called for a name that already exists in some form.
    #[error("application already exists: {0}")]
    AlreadyExists(String),

    /// Upload file name is neither `.html`/`.htm` nor `.zip`.
    #[error("unsupported upload {0:?}: expected an .html file or a .zip archive")]
    UnsupportedUpload(String),

    /// Archive has no `index.html` at its root (or under a single top-level folder).
    #[error("archive does not contain an index.html")]
    MissingIndex,

    /// Archive could not be read.
    #[error("invalid archive: {0}")]
    InvalidArchive(#[from] zip::result::ZipError),

    /// Archive entry with an absolute path or `..` component.
    #[error("archive entry escapes the application directory: {0:?}")]
    UnsafeArchiveEntry(String),

    /// Uncompressed archive content exceeds the extraction limit.
    #[error("archive exceeds the extraction limit of {limit} bytes")]
    ArchiveTooLarge { limit: u64 },

    /// Archive has more entries than the extraction limit allows.
    #[error("archive has more than {limit} entries")]
    TooManyEntries { limit: usize },

    /// Catalog lookup failed (including ambiguous forms).
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = StoreError::AssetNotFound {
            app: "foo".into(),
            path: "img/a.png".into(),
        };
        assert_eq!(err.to_string(), "asset not found: foo/img/a.png");
        assert!(StoreError::UnsupportedUpload("x.pdf".into())
            .to_string()
            .contains("x.pdf"));
        assert!(StoreError::ArchiveTooLarge { limit: 10 }
            .to_string()
            .contains("10 bytes"));
    }

    #[test]
    fn ambiguous_form_is_transparent() {
        let err: StoreError = CatalogError::AmbiguousForm("dup".into()).into();
        assert!(err.to_string().contains("both single-file and directory"));
    }
}
