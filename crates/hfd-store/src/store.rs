//! # Filesystem Application Store
//!
//! Applications live directly under the apps root:
//!
//! ```text
//! <root>/<name>.html                 single-file form
//! <root>/<name>/index.html           directory form
//! <root>/<name>/<asset path>         directory-form assets
//! <root>/.staging-<uuid>/            in-flight upload (publish.rs)
//! <root>/.trash-<uuid>/              retired form awaiting removal
//! ```
//!
//! Reads take no lock. Publication only ever renames complete trees into
//! place, so a reader sees the old application, the new one, or briefly
//! nothing.

use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use hfd_core::{
    rewrite_document, AppCatalog, AppForm, AppName, Application, AssetPath, CatalogError,
    INDEX_DOCUMENT,
};
use parking_lot::Mutex;

use crate::archive::ExtractLimits;
use crate::error::StoreError;

pub(crate) const STAGING_PREFIX: &str = ".staging-";
pub(crate) const TRASH_PREFIX: &str = ".trash-";

/// Bytes of an application's root document together with its form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootDocument {
    /// Form the document was read from; directory documents get rewritten.
    pub form: AppForm,
    /// Raw document bytes.
    pub bytes: Vec<u8>,
}

impl RootDocument {
    /// The document as it is served: directory-form documents have their
    /// root-relative URLs rewritten, single-file documents are verbatim.
    pub fn into_served_bytes(self) -> Vec<u8> {
        match self.form {
            AppForm::SingleFile => self.bytes,
            AppForm::Directory => {
                let html = String::from_utf8_lossy(&self.bytes);
                if let Cow::Owned(_) = html {
                    tracing::warn!("root document is not valid UTF-8; serving a lossy conversion");
                }
                rewrite_document(&html).into_bytes()
            }
        }
    }
}

/// Application store rooted at a directory on the local filesystem.
#[derive(Debug)]
pub struct FsAppStore {
    root: PathBuf,
    pub(crate) limits: ExtractLimits,
    writers: Mutex<HashMap<AppName, Arc<Mutex<()>>>>,
}

impl FsAppStore {
    /// Open (creating if needed) the apps root and sweep leftovers of
    /// interrupted publications.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let store = Self {
            root,
            limits: ExtractLimits::default(),
            writers: Mutex::new(HashMap::new()),
        };
        store.sweep()?;
        Ok(store)
    }

    /// Replace the archive extraction limits.
    pub fn with_limits(mut self, limits: ExtractLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The apps root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn single_file_path(&self, name: &AppName) -> PathBuf {
        self.root.join(name.single_file_name())
    }

    pub(crate) fn directory_path(&self, name: &AppName) -> PathBuf {
        self.root.join(name.as_str())
    }

    /// Per-name writer mutex. Entries are never removed; the map is bounded
    /// by the number of names ever written.
    pub(crate) fn writer_lock(&self, name: &AppName) -> Arc<Mutex<()>> {
        self.writers.lock().entry(name.clone()).or_default().clone()
    }

    fn sweep(&self) -> Result<(), StoreError> {
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if !(file_name.starts_with(STAGING_PREFIX) || file_name.starts_with(TRASH_PREFIX)) {
                continue;
            }
            match fs::remove_dir_all(entry.path()) {
                Ok(()) => tracing::info!(path = %entry.path().display(), "removed publication leftover"),
                Err(e) => tracing::warn!(
                    path = %entry.path().display(),
                    error = %e,
                    "failed to remove publication leftover"
                ),
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Forms currently present for `name`, without the ambiguity check.
    pub(crate) fn present_forms(&self, name: &AppName) -> io::Result<Vec<AppForm>> {
        let mut forms = Vec::with_capacity(1);
        if is_regular_file(&self.single_file_path(name))? {
            forms.push(AppForm::SingleFile);
        }
        let dir = self.directory_path(name);
        if is_directory(&dir)? && is_regular_file(&dir.join(INDEX_DOCUMENT))? {
            forms.push(AppForm::Directory);
        }
        Ok(forms)
    }

    /// Which form `name` exists in. A directory without `index.html` does
    /// not count.
    pub fn form(&self, name: &AppName) -> Result<Option<AppForm>, CatalogError> {
        match self.present_forms(name)?.as_slice() {
            [] => Ok(None),
            [form] => Ok(Some(*form)),
            _ => Err(CatalogError::AmbiguousForm(name.to_string())),
        }
    }

    /// Whether `asset` is a regular file inside the directory of `name`.
    pub fn asset_exists(&self, name: &AppName, asset: &AssetPath) -> bool {
        asset.join_onto(&self.directory_path(name)).is_file()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Read the root document of `name`.
    pub fn read_root_document(&self, name: &AppName) -> Result<RootDocument, StoreError> {
        let form = self
            .form(name)?
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let path = self.root.join(form.root_document(name));
        let bytes = fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(name.to_string()),
            _ => StoreError::Io(e),
        })?;
        Ok(RootDocument { form, bytes })
    }

    /// Read one asset of a directory-form application.
    pub fn read_asset(&self, name: &AppName, asset: &AssetPath) -> Result<Vec<u8>, StoreError> {
        let not_found = || StoreError::AssetNotFound {
            app: name.to_string(),
            path: asset.to_string(),
        };
        let path = asset.join_onto(&self.directory_path(name));
        if !path.is_file() {
            return Err(not_found());
        }
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => not_found(),
            _ => StoreError::Io(e),
        })
    }

    /// Describe one application.
    pub fn describe(&self, name: &AppName) -> Result<Application, StoreError> {
        let form = self
            .form(name)?
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let root_document = form.root_document(name);
        let meta = fs::metadata(self.root.join(&root_document))?;
        let created = meta.created().or_else(|_| meta.modified())?;
        Ok(Application {
            name: name.clone(),
            form,
            root_document,
            created_at: DateTime::<Utc>::from(created),
        })
    }

    /// All deployed applications, newest first, ties broken by name.
    ///
    /// Names present in both forms are skipped with a warning.
    pub fn list(&self) -> Result<Vec<Application>, StoreError> {
        let mut names = BTreeSet::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let candidate = match file_name.strip_suffix(".html") {
                Some(stem) => stem,
                None => file_name,
            };
            if let Ok(name) = AppName::parse(candidate) {
                names.insert(name);
            }
        }

        let mut apps = Vec::with_capacity(names.len());
        for name in names {
            match self.describe(&name) {
                Ok(app) => apps.push(app),
                Err(StoreError::NotFound(_)) => {}
                Err(StoreError::Catalog(CatalogError::AmbiguousForm(_))) => {
                    tracing::warn!(app = %name, "skipping application present in both forms");
                }
                Err(e) => return Err(e),
            }
        }
        apps.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(apps)
    }
}

impl AppCatalog for FsAppStore {
    fn form(&self, app: &AppName) -> Result<Option<AppForm>, CatalogError> {
        FsAppStore::form(self, app)
    }

    fn has_asset(&self, app: &AppName, asset: &AssetPath) -> bool {
        self.asset_exists(app, asset)
    }
}

fn is_regular_file(path: &Path) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

fn is_directory(path: &Path) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.is_dir()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
