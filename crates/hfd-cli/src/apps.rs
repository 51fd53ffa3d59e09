//! # Application Management Subcommands
//!
//! `list`, `deploy`, `update` and `remove` against the apps root, using the
//! same publication path as the HTTP admin API.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use hfd_core::{AppName, Application};
use hfd_store::{FsAppStore, StoreError, Upload};

/// Arguments for `hfd deploy` and `hfd update`.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Application name (letters, digits, `_` and `-`).
    #[arg(value_name = "NAME")]
    pub name: String,
    /// `.html`/`.htm` file or `.zip` bundle containing `index.html`.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for `hfd remove`.
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Application name.
    #[arg(value_name = "NAME")]
    pub name: String,
}

/// Execute `hfd list`.
pub fn run_list(apps_dir: &Path) -> Result<u8> {
    let store = crate::open_store(apps_dir)?;
    let apps = store.list().context("failed to list applications")?;
    print!("{}", format_table(&apps));
    Ok(0)
}

/// Execute `hfd deploy`.
pub fn run_deploy(args: &DeployArgs, apps_dir: &Path) -> Result<u8> {
    let store = crate::open_store(apps_dir)?;
    let (name, upload) = load_upload(args)?;
    match store.create(&name, &upload) {
        Ok(app) => {
            println!("OK: deployed {} ({}) at /apps/{}/", app.name, app.form, app.name);
            Ok(0)
        }
        Err(StoreError::AlreadyExists(_)) => {
            println!("EXISTS: application {name} already exists; use `hfd update`");
            Ok(1)
        }
        Err(e) => Err(e).with_context(|| format!("failed to deploy {name}")),
    }
}

/// Execute `hfd update`.
pub fn run_update(args: &DeployArgs, apps_dir: &Path) -> Result<u8> {
    let store = crate::open_store(apps_dir)?;
    let (name, upload) = load_upload(args)?;
    match store.replace(&name, &upload) {
        Ok(app) => {
            println!("OK: updated {} ({})", app.name, app.form);
            Ok(0)
        }
        Err(StoreError::NotFound(_)) => {
            println!("NOT FOUND: application {name}");
            Ok(1)
        }
        Err(e) => Err(e).with_context(|| format!("failed to update {name}")),
    }
}

/// Execute `hfd remove`.
pub fn run_remove(args: &RemoveArgs, apps_dir: &Path) -> Result<u8> {
    let store = crate::open_store(apps_dir)?;
    let name = parse_name(&args.name)?;
    remove(&store, &name)
}

fn remove(store: &FsAppStore, name: &AppName) -> Result<u8> {
    match store.delete(name) {
        Ok(()) => {
            println!("OK: removed {name}");
            Ok(0)
        }
        Err(StoreError::NotFound(_)) => {
            println!("NOT FOUND: application {name}");
            Ok(1)
        }
        Err(e) => Err(e).with_context(|| format!("failed to remove {name}")),
    }
}

fn parse_name(raw: &str) -> Result<AppName> {
    AppName::parse(raw).with_context(|| format!("invalid application name {raw:?}"))
}

fn load_upload(args: &DeployArgs) -> Result<(AppName, Upload)> {
    let name = parse_name(&args.name)?;
    if !args.file.is_file() {
        bail!("file not found: {}", args.file.display());
    }
    let filename = args
        .file
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("failed to read file: {}", args.file.display()))?;
    tracing::debug!(app = %name, %filename, len = bytes.len(), "loaded upload");
    Ok((name, Upload::new(filename, bytes)))
}

/// Render applications as an aligned text table.
pub fn format_table(apps: &[Application]) -> String {
    if apps.is_empty() {
        return "no applications deployed\n".to_string();
    }
    let width = apps
        .iter()
        .map(|a| a.name.as_str().len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut out = format!("{:<width$}  {:<11}  CREATED\n", "NAME", "FORM");
    for app in apps {
        out.push_str(&format!(
            "{:<width$}  {:<11}  {}\n",
            app.name.as_str(),
            app.form.as_str(),
            app.created_at.format("%Y-%m-%d %H:%M:%S"),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deploy_args(name: &str, file: PathBuf) -> DeployArgs {
        DeployArgs {
            name: name.to_string(),
            file,
        }
    }

    #[test]
    fn deploy_then_update_then_remove() {
        let dir = tempfile::tempdir().unwrap();
        let apps = dir.path().join("apps");
        let page = dir.path().join("page.html");
        std::fs::write(&page, "<p>v1</p>").unwrap();

        assert_eq!(run_deploy(&deploy_args("page", page.clone()), &apps).unwrap(), 0);
        assert!(apps.join("page.html").is_file());
        assert_eq!(run_deploy(&deploy_args("page", page.clone()), &apps).unwrap(), 1);

        std::fs::write(&page, "<p>v2</p>").unwrap();
        assert_eq!(run_update(&deploy_args("page", page), &apps).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(apps.join("page.html")).unwrap(), "<p>v2</p>");

        let remove_args = RemoveArgs {
            name: "page".into(),
        };
        assert_eq!(run_remove(&remove_args, &apps).unwrap(), 0);
        assert_eq!(run_remove(&remove_args, &apps).unwrap(), 1);
    }

    #[test]
    fn update_of_missing_app_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("page.html");
        std::fs::write(&page, "<p/>").unwrap();
        let code = run_update(&deploy_args("ghost", page), &dir.path().join("apps")).unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn deploy_rejects_bad_name_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let apps = dir.path().join("apps");
        let page = dir.path().join("page.html");
        std::fs::write(&page, "<p/>").unwrap();

        let err = run_deploy(&deploy_args("bad name", page), &apps).unwrap_err();
        assert!(err.to_string().contains("invalid application name"), "{err}");

        let err = run_deploy(&deploy_args("ok", dir.path().join("nope.html")), &apps).unwrap_err();
        assert!(err.to_string().contains("file not found"), "{err}");
    }

    #[test]
    fn deploy_unsupported_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, "hello").unwrap();
        let err = run_deploy(&deploy_args("notes", notes), &dir.path().join("apps")).unwrap_err();
        assert!(format!("{err:#}").contains("unsupported upload"), "{err:#}");
    }

    #[test]
    fn table_aligns_columns() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAppStore::open(dir.path()).unwrap();
        assert_eq!(format_table(&[]), "no applications deployed\n");

        store
            .create(
                &AppName::parse("a-much-longer-name").unwrap(),
                &Upload::new("x.html", b"x".to_vec()),
            )
            .unwrap();
        let table = format_table(&store.list().unwrap());
        let mut lines = table.lines();
        let header = lines.next().unwrap();
        let row = lines.next().unwrap();
        assert!(header.starts_with("NAME "));
        assert!(row.starts_with("a-much-longer-name  single_file"));
        assert_eq!(header.find("FORM"), row.find("single_file"));
    }
}
