//! # Asset Paths
//!
//! A relative path to a static file inside a directory-form application.
//! [`AssetPath`] normalizes the request-derived path and rejects anything
//! that could escape the application directory, so joining it onto the
//! directory is always safe.

use std::path::{Path, PathBuf};

use crate::error::ValidationError;
use crate::name::AppName;

const PARENT_SEGMENT: &str = "parent directory segment";
const BACKSLASH: &str = "backslash separator";
const NUL_BYTE: &str = "NUL byte";

/// A normalized, non-empty, `/`-separated relative path.
///
/// Invariants: no leading `/`, no `.` or `..` segments, no empty segments,
/// no backslashes or NUL bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetPath(String);

impl AssetPath {
    /// Normalize and validate a relative asset path.
    ///
    /// A leading `./` and inner `.` segments are dropped; `a/./b` becomes
    /// `a/b`. Everything else that does not fit the invariants is rejected.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let reject = |reason| ValidationError::InvalidAssetPath {
            path: raw.to_string(),
            reason,
        };

        if raw.is_empty() {
            return Err(reject("empty path"));
        }
        if raw.contains('\\') {
            return Err(reject(BACKSLASH));
        }
        if raw.contains('\0') {
            return Err(reject(NUL_BYTE));
        }
        if raw.split('/').any(|segment| segment == "..") {
            return Err(reject(PARENT_SEGMENT));
        }
        if raw.starts_with('/') {
            return Err(reject("absolute path"));
        }

        let mut segments = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "." => continue,
                "" => return Err(reject("empty path segment")),
                s => segments.push(s),
            }
        }
        if segments.is_empty() {
            return Err(reject("empty path"));
        }
        Ok(Self(segments.join("/")))
    }

    /// The normalized path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path segment (the file name).
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Split into the first segment and the remaining path, if any remains.
    pub fn split_first(&self) -> Option<(&str, AssetPath)> {
        let (first, rest) = self.0.split_once('/')?;
        Some((first, AssetPath(rest.to_string())))
    }

    /// Drop a leading `<app>/` segment, if present and something remains.
    pub fn strip_app_prefix(&self, app: &AppName) -> Option<AssetPath> {
        match self.split_first() {
            Some((first, rest)) if first == app.as_str() => Some(rest),
            _ => None,
        }
    }

    /// Join onto a base directory, one component per segment.
    pub fn join_onto(&self, base: &Path) -> PathBuf {
        let mut path = base.to_path_buf();
        for segment in self.0.split('/') {
            path.push(segment);
        }
        path
    }
}

/// Whether a rejection means the path tried to leave its directory (`..`,
/// backslash, NUL) rather than just being malformed (empty segments, a
/// leading `/`).
pub(crate) fn escapes_directory(err: &ValidationError) -> bool {
    matches!(
        err,
        ValidationError::InvalidAssetPath { reason, .. }
            if [PARENT_SEGMENT, BACKSLASH, NUL_BYTE].contains(reason)
    )
}

impl std::fmt::Display for AssetPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
