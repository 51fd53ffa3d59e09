//! # Inspection Subcommands
//!
//! `resolve` prints which application and file a request below `/apps/`
//! would be served from. `render` prints an application's root document
//! exactly as the server sends it.

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use hfd_core::{classify, resolve, AppName, Resolution, ResolveError};
use hfd_store::StoreError;

/// Arguments for `hfd resolve`.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Request path below `/apps/`, e.g. `foo/` or `style.css`.
    #[arg(value_name = "PATH")]
    pub path: String,
    /// Referer header value to resolve bare asset requests against.
    #[arg(long, value_name = "URL")]
    pub referer: Option<String>,
}

/// Arguments for `hfd render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Application name.
    #[arg(value_name = "NAME")]
    pub name: String,
}

/// Execute `hfd resolve`.
pub fn run_resolve(args: &ResolveArgs, apps_dir: &Path) -> Result<u8> {
    let store = crate::open_store(apps_dir)?;
    let path = args.path.strip_prefix("/apps/").unwrap_or(&args.path);

    match resolve(&store, path, args.referer.as_deref()) {
        Ok(resolution) => {
            println!("{}", describe(&resolution));
            Ok(0)
        }
        Err(ResolveError::NotFound(what)) => {
            println!("NOT FOUND: {what}");
            Ok(1)
        }
        Err(ResolveError::BadRequest(e)) => {
            println!("BAD REQUEST: {e}");
            Ok(1)
        }
        Err(e @ ResolveError::Catalog(_)) => bail!("resolution failed: {e}"),
    }
}

/// One-line description of a resolution.
pub fn describe(resolution: &Resolution) -> String {
    match resolution {
        Resolution::RootDocument { app, form } => {
            format!(
                "root-document app={app} form={form} file={}",
                form.root_document(app)
            )
        }
        Resolution::Asset { app, path } => format!(
            "asset app={app} file={app}/{path} content-type={}",
            classify(path.as_str())
        ),
    }
}

/// Execute `hfd render`.
pub fn run_render(args: &RenderArgs, apps_dir: &Path) -> Result<u8> {
    let store = crate::open_store(apps_dir)?;
    let name = AppName::parse(args.name.as_str())
        .with_context(|| format!("invalid application name {:?}", args.name))?;

    let document = match store.read_root_document(&name) {
        Ok(document) => document,
        Err(StoreError::NotFound(_)) => {
            println!("NOT FOUND: application {name}");
            return Ok(1);
        }
        Err(e) => return Err(e).with_context(|| format!("failed to read {name}")),
    };

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&document.into_served_bytes())
        .context("failed to write document")?;
    stdout.flush().context("failed to write document")?;
    Ok(0)
}
