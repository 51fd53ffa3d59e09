//! # Zip Bundle Extraction
//!
//! Unpacks an uploaded zip bundle into a staging directory and locates the
//! directory that becomes the application root.
//!
//! Entries go through `ZipFile::enclosed_name`, so absolute paths and `..`
//! components are rejected before anything is written. macOS resource-fork
//! folders (`__MACOSX/`) are skipped. Entry count and total uncompressed size
//! are capped by [`ExtractLimits`].

use std::ffi::OsStr;
use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};

use hfd_core::INDEX_DOCUMENT;
use zip::ZipArchive;

use crate::error::StoreError;

/// Bounds applied while extracting an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractLimits {
    /// Maximum number of entries in the archive.
    pub max_entries: usize,
    /// Maximum total uncompressed bytes written.
    pub max_total_bytes: u64,
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            max_total_bytes: 256 * 1024 * 1024,
        }
    }
}

/// Extract `bytes` into `dest` and return the directory holding `index.html`.
///
/// That is `dest` itself, or the single top-level folder of the archive when
/// the bundle was zipped from its parent directory.
pub(crate) fn extract(
    bytes: &[u8],
    dest: &Path,
    limits: &ExtractLimits,
) -> Result<PathBuf, StoreError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    if archive.len() > limits.max_entries {
        return Err(StoreError::TooManyEntries {
            limit: limits.max_entries,
        });
    }

    let mut total: u64 = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(StoreError::UnsafeArchiveEntry(entry.name().to_string()));
        };
        if relative.as_os_str().is_empty() || is_resource_fork(&relative) {
            continue;
        }

        let out = dest.join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }

        let remaining = limits.max_total_bytes - total;
        let mut file = fs::File::create(&out)?;
        total += io::copy(&mut entry.by_ref().take(remaining + 1), &mut file)?;
        if total > limits.max_total_bytes {
            return Err(StoreError::ArchiveTooLarge {
                limit: limits.max_total_bytes,
            });
        }
    }

    locate_root(dest)
}

fn is_resource_fork(path: &Path) -> bool {
    path.components().next() == Some(Component::Normal(OsStr::new("__MACOSX")))
}

fn locate_root(dest: &Path) -> Result<PathBuf, StoreError> {
    if dest.join(INDEX_DOCUMENT).is_file() {
        return Ok(dest.to_path_buf());
    }

    let mut visible = Vec::new();
    for entry in fs::read_dir(dest)? {
        let entry = entry?;
        if !entry.file_name().to_string_lossy().starts_with('.') {
            visible.push(entry.path());
        }
    }

    match visible.as_slice() {
        [only] if only.is_dir() && only.join(INDEX_DOCUMENT).is_file() => Ok(only.clone()),
        _ => Err(StoreError::MissingIndex),
    }
}
