//! # Publication
//!
//! Create, replace and delete applications.
//!
//! An upload is first staged in full under `<root>/.staging-<uuid>`. Only
//! when staging succeeded does anything visible change:
//!
//! 1. every path currently occupied by the name is renamed into
//!    `<root>/.trash-<uuid>`,
//! 2. the staged content is renamed to its final path,
//! 3. the trash directory is removed.
//!
//! A failed step 2 renames the retired paths back. Writers for one name are
//! serialized; writers for different names and all readers run freely.

use std::fs;
use std::path::{Path, PathBuf};

use hfd_core::{AppForm, AppName, Application};
use uuid::Uuid;

use crate::archive;
use crate::error::StoreError;
use crate::store::{FsAppStore, STAGING_PREFIX, TRASH_PREFIX};

/// How an uploaded file is deployed, decided by its file name extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// `.html` or `.htm`: deployed as `<name>.html`.
    Html,
    /// `.zip`: extracted and deployed as `<name>/`.
    Archive,
}

impl UploadKind {
    /// Classify an upload by its file name, case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self, StoreError> {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("html" | "htm") => Ok(Self::Html),
            Some("zip") => Ok(Self::Archive),
            _ => Err(StoreError::UnsupportedUpload(filename.to_string())),
        }
    }

    /// Application form this upload produces.
    pub fn form(&self) -> AppForm {
        match self {
            Self::Html => AppForm::SingleFile,
            Self::Archive => AppForm::Directory,
        }
    }
}

/// An uploaded file as received from an operator.
#[derive(Clone)]
pub struct Upload {
    /// Client-supplied file name; only its extension is used.
    pub filename: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Wrap an uploaded file.
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Classify this upload.
    pub fn kind(&self) -> Result<UploadKind, StoreError> {
        UploadKind::from_filename(&self.filename)
    }
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Staging directory, removed on drop.
struct Staging {
    dir: PathBuf,
    content: PathBuf,
    form: AppForm,
}

impl Drop for Staging {
    fn drop(&mut self) {
        if self.dir.exists() {
            if let Err(e) = fs::remove_dir_all(&self.dir) {
                tracing::warn!(path = %self.dir.display(), error = %e, "failed to remove staging directory");
            }
        }
    }
}

/// Paths moved into a trash directory, with their original locations.
struct Retired {
    trash: PathBuf,
    moved: Vec<(PathBuf, PathBuf)>,
}

impl Retired {
    /// Move everything back where it came from.
    fn restore(self) {
        for (original, parked) in self.moved.iter().rev() {
            if let Err(e) = fs::rename(parked, original) {
                tracing::error!(
                    path = %original.display(),
                    error = %e,
                    "failed to restore retired application content"
                );
            }
        }
        self.discard();
    }

    /// Remove the trash directory and whatever is still in it.
    fn discard(self) {
        if let Err(e) = fs::remove_dir_all(&self.trash) {
            tracing::warn!(path = %self.trash.display(), error = %e, "failed to remove trash directory");
        }
    }
}

impl FsAppStore {
    /// Deploy a new application. Fails if `name` exists in any form.
    pub fn create(&self, name: &AppName, upload: &Upload) -> Result<Application, StoreError> {
        let lock = self.writer_lock(name);
        let _guard = lock.lock();

        if !self.present_forms(name)?.is_empty() {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        let staging = self.stage(upload)?;
        self.publish(name, &staging)?;
        tracing::info!(app = %name, form = %staging.form, "application created");
        drop(staging);
        self.describe(name)
    }

    /// Replace an existing application, in whichever form it exists, with
    /// the uploaded content. The old content is discarded, never merged.
    pub fn replace(&self, name: &AppName, upload: &Upload) -> Result<Application, StoreError> {
        let lock = self.writer_lock(name);
        let _guard = lock.lock();

        let previous = self.present_forms(name)?;
        if previous.is_empty() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let staging = self.stage(upload)?;
        self.publish(name, &staging)?;
        tracing::info!(app = %name, ?previous, form = %staging.form, "application replaced");
        drop(staging);
        self.describe(name)
    }

    /// Remove an application in whichever form(s) it exists.
    pub fn delete(&self, name: &AppName) -> Result<(), StoreError> {
        let lock = self.writer_lock(name);
        let _guard = lock.lock();

        let previous = self.present_forms(name)?;
        if previous.is_empty() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        self.retire(name)?.discard();
        tracing::info!(app = %name, ?previous, "application deleted");
        Ok(())
    }

    fn stage(&self, upload: &Upload) -> Result<Staging, StoreError> {
        let kind = upload.kind()?;
        let dir = self
            .root()
            .join(format!("{STAGING_PREFIX}{}", Uuid::new_v4()));
        fs::create_dir(&dir)?;
        let mut staging = Staging {
            content: dir.clone(),
            dir,
            form: kind.form(),
        };

        match kind {
            UploadKind::Html => {
                let document = staging.dir.join("document.html");
                fs::write(&document, &upload.bytes)?;
                staging.content = document;
            }
            UploadKind::Archive => {
                let bundle = staging.dir.join("bundle");
                fs::create_dir(&bundle)?;
                staging.content = archive::extract(&upload.bytes, &bundle, &self.limits)?;
            }
        }
        Ok(staging)
    }

    /// Move every path occupied by `name` into a fresh trash directory.
    fn retire(&self, name: &AppName) -> Result<Retired, StoreError> {
        let trash = self
            .root()
            .join(format!("{TRASH_PREFIX}{}", Uuid::new_v4()));
        fs::create_dir(&trash)?;
        let mut retired = Retired {
            trash,
            moved: Vec::new(),
        };

        for original in [self.single_file_path(name), self.directory_path(name)] {
            if fs::symlink_metadata(&original).is_err() {
                continue;
            }
            let parked = retired.trash.join(file_name_of(&original));
            if let Err(e) = fs::rename(&original, &parked) {
                retired.restore();
                return Err(e.into());
            }
            retired.moved.push((original, parked));
        }
        Ok(retired)
    }

    fn publish(&self, name: &AppName, staging: &Staging) -> Result<(), StoreError> {
        let target = match staging.form {
            AppForm::SingleFile => self.single_file_path(name),
            AppForm::Directory => self.directory_path(name),
        };
        let retired = self.retire(name)?;
        if let Err(e) = fs::rename(&staging.content, &target) {
            tracing::error!(app = %name, error = %e, "publication failed, restoring previous content");
            retired.restore();
            return Err(e.into());
        }
        retired.discard();
        Ok(())
    }
}

fn file_name_of(path: &Path) -> PathBuf {
    path.file_name().map(PathBuf::from).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_kind_by_extension() {
        assert_eq!(UploadKind::from_filename("page.html").unwrap(), UploadKind::Html);
        assert_eq!(UploadKind::from_filename("PAGE.HTM").unwrap(), UploadKind::Html);
        assert_eq!(UploadKind::from_filename("site.Zip").unwrap(), UploadKind::Archive);
        assert_eq!(UploadKind::Archive.form(), AppForm::Directory);
    }

    #[test]
    fn unsupported_uploads_are_rejected() {
        for filename in ["notes.txt", "archive.tar.gz", "html", "page.html.bak", ""] {
            assert!(
                matches!(
                    UploadKind::from_filename(filename),
                    Err(StoreError::UnsupportedUpload(_))
                ),
                "{filename:?} should be rejected"
            );
        }
    }

    #[test]
    fn debug_omits_upload_bytes() {
        let upload = Upload::new("a.html", b"<p>secret</p>".to_vec());
        let debug = format!("{upload:?}");
        assert!(debug.contains("a.html"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn failed_staging_leaves_no_trace() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAppStore::open(dir.path()).unwrap();
        let name = AppName::parse("broken").unwrap();
        let err = store
            .create(&name, &Upload::new("site.zip", b"not a zip".to_vec()))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidArchive(_)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
