//! # hfd-store — Filesystem Application Store
//!
//! Persists HTML Fast Deploy applications under one apps root directory:
//!
//! - **Lookup and reads** ([`FsAppStore`]) implement the
//!   [`AppCatalog`](hfd_core::AppCatalog) contract the resolver consumes,
//!   plus root-document and asset reads and listing.
//! - **Publication** (`create` / `replace` / `delete`) stages uploads and
//!   swaps them into place by rename, so readers never see a partially
//!   written application.
//! - **Archive extraction** unpacks zip bundles with path-escape and size
//!   checks, hoisting a single top-level folder.

pub mod archive;
pub mod error;
pub mod publish;
pub mod store;

// Re-export primary types.
pub use archive::ExtractLimits;
pub use error::StoreError;
pub use publish::{Upload, UploadKind};
pub use store::{FsAppStore, RootDocument};
