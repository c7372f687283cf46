//! End-to-end builds of the fixture site with the real template engine.

use miso::{config, files, generate};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

fn fixture_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    files::copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn build(root: &Path) -> generate::BuildReport {
    let site_config = config::load_config(root, None).unwrap();
    generate::build(root, &site_config).unwrap()
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join("_site").join(relative))
        .unwrap_or_else(|e| panic!("{relative} not readable: {e}"))
}

/// Relative path → contents of every file under `dir`.
fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(dir)
        .into_iter()
        .map(Result::unwrap)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(dir).unwrap();
            (
                rel.to_string_lossy().replace('\\', "/"),
                fs::read(e.path()).unwrap(),
            )
        })
        .collect()
}

#[test]
fn builds_pages_items_and_listings() {
    let tmp = fixture_project();
    let report = build(tmp.path());

    assert_eq!(report.page_count(), 11);
    assert_eq!(report.output_dir, tmp.path().join("_site"));

    let index = read(tmp.path(), "index.html");
    assert!(index.contains("<title>Welcome | Fixture Site</title>"));
    assert!(index.contains("<strong>fixture</strong>"));

    let about = read(tmp.path(), "about/index.html");
    assert!(about.contains("class=\"about\""));

    let hello = read(tmp.path(), "blog/2024/hello-world/index.html");
    assert!(hello.contains("<h1>Hello, world</h1>"));
    assert!(hello.contains("<li>intro</li>"));
    assert!(hello.contains("<a href=\"\">nowhere</a>"));
    assert!(!hello.contains("javascript:"));
}

#[test]
fn listings_are_paginated() {
    let tmp = fixture_project();
    build(tmp.path());

    let first = read(tmp.path(), "blog/index.html");
    assert!(first.contains("Page 1 of 2"));
    assert!(first.contains("Spring"));
    assert!(first.contains("Hello, world"));
    assert!(!first.contains("rel=\"prev\""));
    assert!(first.contains("rel=\"next\""));

    let second = read(tmp.path(), "blog/page/2/index.html");
    assert!(second.contains("Page 2 of 2"));
    assert!(second.contains("First post"));
    assert!(second.contains("rel=\"prev\""));
    assert!(!second.contains("rel=\"next\""));
}

#[test]
fn menus_reach_every_page() {
    let tmp = fixture_project();
    build(tmp.path());

    for page in ["index.html", "blog/index.html", "recipes/soup/index.html"] {
        let html = read(tmp.path(), page);
        assert!(html.contains(">Blog</a>"), "{page} is missing the main menu");
    }
}

#[test]
fn assets_are_copied_and_sources_are_not() {
    let tmp = fixture_project();
    build(tmp.path());

    let out = tmp.path().join("_site");
    assert_eq!(
        fs::read_to_string(out.join("css/style.css")).unwrap(),
        fs::read_to_string(tmp.path().join("css/style.css")).unwrap()
    );
    assert!(!out.join("images").exists());
    assert!(!out.join("recipes/shopping.txt").exists());
    assert!(!out.join("posts").exists());
}

#[test]
fn stale_output_is_removed() {
    let tmp = fixture_project();
    let stale = tmp.path().join("_site/old/index.html");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, "stale").unwrap();

    build(tmp.path());

    assert!(!stale.exists());
    assert!(tmp.path().join("_site/index.html").is_file());
}

#[test]
fn rebuilds_are_identical() {
    let tmp = fixture_project();
    build(tmp.path());
    let first = snapshot(&tmp.path().join("_site"));

    build(tmp.path());
    let second = snapshot(&tmp.path().join("_site"));

    assert_eq!(first.keys().collect::<Vec<_>>(), second.keys().collect::<Vec<_>>());
    assert!(first == second);
}

#[test]
fn missing_layout_fails_with_hint() {
    let tmp = fixture_project();
    fs::remove_file(tmp.path().join("templates/post.html")).unwrap();

    let site_config = config::load_config(tmp.path(), None).unwrap();
    let err = generate::build(tmp.path(), &site_config).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("post.html"), "{message}");
    assert!(matches!(err, generate::BuildError::ItemRender { .. }));
}
