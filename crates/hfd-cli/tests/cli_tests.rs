//! End-to-end runs of the `hfd` subcommand handlers against a temporary
//! apps root.

use std::io::Write;
use std::path::Path;

use hfd_cli::apps::{run_deploy, run_list, run_update, DeployArgs};
use hfd_cli::inspect::{run_render, run_resolve, RenderArgs, ResolveArgs};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    for (name, body) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

#[test]
fn zip_bundle_deploys_and_resolves() {
    let dir = tempfile::tempdir().unwrap();
    let apps = dir.path().join("apps");
    let bundle = dir.path().join("site.zip");
    write_zip(
        &bundle,
        &[
            ("site/index.html", r#"<link href="style.css">"#),
            ("site/style.css", "body{}"),
        ],
    );

    let args = DeployArgs {
        name: "site".into(),
        file: bundle,
    };
    assert_eq!(run_deploy(&args, &apps).unwrap(), 0);
    assert!(apps.join("site/index.html").is_file());
    assert!(apps.join("site/style.css").is_file());
    assert_eq!(run_list(&apps).unwrap(), 0);

    let resolve = |path: &str, referer: Option<&str>| {
        let args = ResolveArgs {
            path: path.into(),
            referer: referer.map(str::to_string),
        };
        run_resolve(&args, &apps).unwrap()
    };
    assert_eq!(resolve("site/", None), 0);
    assert_eq!(resolve("site/style.css", None), 0);
    assert_eq!(resolve("style.css", Some("http://localhost/apps/site/")), 0);
    assert_eq!(resolve("style.css", Some("http://localhost/apps/other/")), 1);

    let render = RenderArgs {
        name: "site".into(),
    };
    assert_eq!(run_render(&render, &apps).unwrap(), 0);
}

#[test]
fn update_switches_form_without_leftovers() {
    let dir = tempfile::tempdir().unwrap();
    let apps = dir.path().join("apps");
    let bundle = dir.path().join("bundle.zip");
    write_zip(&bundle, &[("index.html", "<p>dir</p>"), ("a.js", "1")]);
    let page = dir.path().join("page.htm");
    std::fs::write(&page, "<p>single</p>").unwrap();

    let as_dir = DeployArgs {
        name: "demo".into(),
        file: bundle,
    };
    assert_eq!(run_deploy(&as_dir, &apps).unwrap(), 0);

    let as_file = DeployArgs {
        name: "demo".into(),
        file: page,
    };
    assert_eq!(run_update(&as_file, &apps).unwrap(), 0);
    assert!(apps.join("demo.html").is_file());
    assert!(!apps.join("demo").exists());
}

#[test]
fn archive_without_index_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let apps = dir.path().join("apps");
    let bundle = dir.path().join("broken.zip");
    write_zip(&bundle, &[("readme.txt", "no index")]);

    let args = DeployArgs {
        name: "broken".into(),
        file: bundle,
    };
    let err = run_deploy(&args, &apps).unwrap_err();
    assert!(format!("{err:#}").contains("index.html"), "{err:#}");
    assert!(!apps.join("broken").exists());
}
