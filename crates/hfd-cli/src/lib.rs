//! # hfd-cli — Command-Line Tool for HTML Fast Deploy
//!
//! Operates directly on an apps root directory, without a running server.
//!
//! ## Subcommands
//!
//! - `hfd list` — table of deployed applications.
//! - `hfd deploy <name> <file>` — create from an `.html` file or `.zip` bundle.
//! - `hfd update <name> <file>` — replace an existing application.
//! - `hfd remove <name>` — delete an application.
//! - `hfd resolve <path> [--referer URL]` — show what `/apps/<path>` serves.
//! - `hfd render <name>` — print the root document exactly as served.
//!
//! ```bash
//! hfd --apps-dir /srv/apps deploy landing dist.zip
//! hfd resolve style.css --referer https://host/apps/landing/
//! ```

pub mod apps;
pub mod inspect;

use std::path::Path;

use anyhow::{Context, Result};
use hfd_store::FsAppStore;

/// Open the store at `apps_dir`, creating the directory if needed.
pub fn open_store(apps_dir: &Path) -> Result<FsAppStore> {
    FsAppStore::open(apps_dir)
        .with_context(|| format!("failed to open apps directory: {}", apps_dir.display()))
}
