//! Content discovery and classification.
//!
//! Stage 1 of the build. Walks the content root, decides which collection
//! every Markdown file belongs to, and turns each one into a [`Document`].
//!
//! ## Directory Structure
//!
//! ```text
//! content/                           # paths.content
//! ├── index.md                       # pages (becomes the site root)
//! ├── about.md                       # pages
//! ├── posts/                         # collection "posts"
//! │   ├── 2024-01-02-hello-world.md  # dated by its filename
//! │   └── 2024/recap.md              # still "posts": first segment wins
//! └── journal/                       # collection "notes" if configured with
//!     └── monday.md                  #   path: content/journal
//! ```
//!
//! ## Classification
//!
//! 1. Configured collection paths are checked in configuration order; the
//!    first one that contains the file (on a directory boundary) wins.
//! 2. Otherwise a file inside a directory belongs to the collection named by
//!    its top-level directory.
//! 3. Files directly in the content root belong to `pages`.
//!
//! ## Derived Metadata
//!
//! - **Slug**: front matter `slug` if set, else the file stem without its
//!   `YYYY-MM-DD-` prefix.
//! - **Date**: front matter `date` if it parses, else the filename prefix.
//!   Unparseable front matter dates are ignored.
//! - `collection`, `slug`, and (when known) `date` are written back into the
//!   front matter so templates see the resolved values.

use crate::collection::Collections;
use crate::config::{ConfigError, SiteConfig};
use crate::document::{self, Document, PAGES_COLLECTION};
use crate::frontmatter::{self, FrontMatterError};
use crate::markdown;
use crate::naming;
use crate::types::{Metadata, scalar_to_string};
use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Content directory {0} not found")]
    MissingContentRoot(PathBuf),
    #[error("Failed to walk content directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: FrontMatterError,
    },
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Absolute content root for a project: `<project>/<paths.content>`.
pub fn content_root(project_root: &Path, config: &SiteConfig) -> Result<PathBuf, ConfigError> {
    let content = config.path("content")?.trim_end_matches(['/', '\\']);
    Ok(project_root.join(content))
}

/// Load every Markdown file under the content root into collections.
pub fn load_content(project_root: &Path, config: &SiteConfig) -> Result<Collections, ScanError> {
    let root = content_root(project_root, config)?;
    if !root.is_dir() {
        return Err(ScanError::MissingContentRoot(root));
    }
    info!(root = %root.display(), "loading content");

    let table = collection_path_table(&root, config)?;
    let mut collections = Collections::new();

    let walker = WalkDir::new(&root).follow_links(true).sort_by_file_name();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }

        let relative = relative_path(&root, entry.path());
        let name = classify(&relative, &table);
        debug!(path = %relative, collection = %name, "classified");

        let doc = load_document(entry.path(), &name)?;
        collections
            .get_or_try_insert_with(&name, || config.collection_config(&name))?
            .add(doc);
    }

    info!(
        collections = collections.len(),
        documents = collections.document_count(),
        "content loaded"
    );
    Ok(collections)
}

/// Whether a file has a `.md` or `.markdown` extension, any case.
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
}

/// `(collection name, root-relative path)` pairs, in match priority order.
///
/// `pages` comes first with an empty path; configured collections follow in
/// configuration order. A configured `pages` takes over the first slot.
pub fn collection_path_table(
    content_root: &Path,
    config: &SiteConfig,
) -> Result<Vec<(String, String)>, ConfigError> {
    let root_str = to_slash(content_root);
    let relative_root = config.path("content")?.trim_matches(['/', '\\']).to_string();

    let mut table = vec![(PAGES_COLLECTION.to_string(), String::new())];
    for name in config.collection_names() {
        let raw = config
            .collection_config(&name)?
            .path
            .unwrap_or_else(|| format!("{root_str}/{name}"));
        let normalized = normalize_collection_path(&raw, &root_str, &relative_root);

        match table.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = normalized,
            None => table.push((name, normalized)),
        }
    }
    Ok(table)
}

/// Reduce a configured collection path to one relative to the content root.
///
/// Accepts content-relative (`posts`), project-relative (`content/posts`),
/// and absolute paths under the content root.
pub fn normalize_collection_path(raw: &str, content_root: &str, relative_root: &str) -> String {
    let raw = raw.replace('\\', "/");
    let mut relative = raw.trim_start_matches('/');

    if !relative_root.is_empty() {
        if let Some(rest) = relative
            .strip_prefix(relative_root)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            relative = rest;
        }
    }

    if let Some(rest) = raw.strip_prefix(content_root) {
        relative = rest.trim_start_matches('/');
    }

    relative.trim_matches('/').to_string()
}

/// Pick the collection for a root-relative, `/`-separated path.
pub fn classify(relative: &str, table: &[(String, String)]) -> String {
    let configured = table
        .iter()
        .filter(|(_, path)| !path.is_empty() && path != ".")
        .find(|(_, path)| {
            relative
                .strip_prefix(path.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
        });
    if let Some((name, _)) = configured {
        return name.clone();
    }

    match relative.split_once('/') {
        Some((first, _)) => first.to_string(),
        None => PAGES_COLLECTION.to_string(),
    }
}

fn load_document(path: &Path, collection: &str) -> Result<Document, ScanError> {
    let bytes = fs::read(path).map_err(|source| ScanError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = String::from_utf8_lossy(&bytes);
    let parsed = frontmatter::extract(&raw).map_err(|source| ScanError::FrontMatter {
        path: path.to_path_buf(),
        source,
    })?;
    let html = markdown::render(&parsed.body);
    let mut front_matter = parsed.metadata;

    let slug = front_matter
        .get("slug")
        .and_then(scalar_to_string)
        .unwrap_or_else(|| {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            naming::slug_from_stem(stem)
        });
    let date = resolve_date(&front_matter, path);

    front_matter.insert("collection".into(), Value::String(collection.to_string()));
    front_matter.insert("slug".into(), Value::String(slug.clone()));
    if let Some(date) = &date {
        front_matter.insert("date".into(), Value::String(document::format_timestamp(date)));
    }

    Ok(Document::new(
        path.to_path_buf(),
        slug,
        collection.to_string(),
        front_matter,
        html,
        parsed.body,
        date,
    ))
}

fn resolve_date(front_matter: &Metadata, path: &Path) -> Option<DateTime<FixedOffset>> {
    if let Some(value) = front_matter.get("date").filter(|v| !v.is_null()) {
        match scalar_to_string(value).and_then(|raw| document::parse_timestamp(&raw)) {
            Some(date) => return Some(date),
            None => debug!(path = %path.display(), date = %value, "ignoring unparseable date"),
        }
    }

    let file_name = path.file_name().and_then(|n| n.to_str())?;
    naming::date_from_file_name(file_name).and_then(document::timestamp_from_date)
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .map(to_slash)
        .unwrap_or_else(|_| to_slash(path))
}

fn to_slash(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::RootDir => out.push('/'),
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use pretty_assertions::assert_eq;

    fn table(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(n, p)| (n.to_string(), p.to_string()))
            .collect()
    }

    // =========================================================================
    // Classification rules
    // =========================================================================

    #[test]
    fn top_level_file_is_pages() {
        let t = table(&[("pages", "")]);
        assert_eq!(classify("about.md", &t), "pages");
    }

    #[test]
    fn first_segment_is_fallback_collection() {
        let t = table(&[("pages", "")]);
        assert_eq!(classify("posts/hello.md", &t), "posts");
        assert_eq!(classify("posts/2024/deep/recap.md", &t), "posts");
    }

    #[test]
    fn configured_prefix_wins_over_first_segment() {
        let t = table(&[("pages", ""), ("notes", "journal")]);
        assert_eq!(classify("journal/monday.md", &t), "notes");
    }

    #[test]
    fn first_matching_entry_wins() {
        let t = table(&[("pages", ""), ("wide", "docs"), ("narrow", "docs/api")]);
        assert_eq!(classify("docs/api/index.md", &t), "wide");
    }

    #[test]
    fn prefix_match_respects_directory_boundary() {
        let t = table(&[("pages", ""), ("post", "post")]);
        assert_eq!(classify("posts/hello.md", &t), "posts");
        assert_eq!(classify("post/hello.md", &t), "post");
    }

    #[test]
    fn dot_path_is_skipped() {
        let t = table(&[("pages", ""), ("everything", ".")]);
        assert_eq!(classify("about.md", &t), "pages");
    }

    #[test]
    fn nested_configured_path() {
        let t = table(&[("pages", ""), ("guides", "docs/guides")]);
        assert_eq!(classify("docs/guides/setup.md", &t), "guides");
        assert_eq!(classify("docs/other.md", &t), "docs");
    }

    // =========================================================================
    // Path normalization
    // =========================================================================

    #[test]
    fn normalize_content_relative() {
        assert_eq!(normalize_collection_path("posts", "/site/content", "content"), "posts");
        assert_eq!(normalize_collection_path("/posts/", "/site/content", "content"), "posts");
    }

    #[test]
    fn normalize_strips_project_relative_content_prefix() {
        assert_eq!(
            normalize_collection_path("content/blog", "/site/content", "content"),
            "blog"
        );
    }

    #[test]
    fn normalize_strips_absolute_content_root() {
        assert_eq!(
            normalize_collection_path("/site/content/blog/", "/site/content", "content"),
            "blog"
        );
    }

    #[test]
    fn path_table_starts_with_pages_and_keeps_config_order() {
        let root = Path::new("/site/content");
        let config = config_from_yaml(
            "collections:\n  zeta: {}\n  notes:\n    path: content/journal\n",
        );
        assert_eq!(
            collection_path_table(root, &config).unwrap(),
            table(&[("pages", ""), ("zeta", "zeta"), ("notes", "journal")])
        );
    }

    #[test]
    fn configured_pages_replaces_builtin_entry_in_place() {
        let root = Path::new("/site/content");
        let config = config_from_yaml(
            "collections:\n  posts: {}\n  pages:\n    path: static\n",
        );
        assert_eq!(
            collection_path_table(root, &config).unwrap(),
            table(&[("pages", "static"), ("posts", "posts")])
        );
    }

    #[test]
    fn markdown_extensions() {
        assert!(is_markdown(Path::new("a.md")));
        assert!(is_markdown(Path::new("a.MD")));
        assert!(is_markdown(Path::new("a.markdown")));
        assert!(!is_markdown(Path::new("a.txt")));
        assert!(!is_markdown(Path::new("md")));
    }

    // =========================================================================
    // load_content on the fixture project
    // =========================================================================

    #[test]
    fn fixture_collections_in_discovery_order() {
        let tmp = setup_fixtures();
        let collections = load_content(tmp.path(), &fixture_config(tmp.path())).unwrap();
        assert_eq!(collections.names(), vec!["pages", "notes", "posts", "recipes"]);
    }

    #[test]
    fn fixture_skips_non_markdown() {
        let tmp = setup_fixtures();
        let collections = load_content(tmp.path(), &fixture_config(tmp.path())).unwrap();
        let recipes = find_collection(&collections, "recipes");
        assert_eq!(document_slugs(recipes), vec!["soup"]);
    }

    #[test]
    fn fixture_configured_path_routes_journal_to_notes() {
        let tmp = setup_fixtures();
        let collections = load_content(tmp.path(), &fixture_config(tmp.path())).unwrap();
        let notes = find_collection(&collections, "notes");
        assert_eq!(document_slugs(notes), vec!["monday"]);
        assert!(collections.get("journal").is_none());
    }

    #[test]
    fn fixture_collection_config_is_attached() {
        let tmp = setup_fixtures();
        let collections = load_content(tmp.path(), &fixture_config(tmp.path())).unwrap();
        let posts = find_collection(&collections, "posts");
        assert_eq!(posts.item_layout(), Some("post.html"));
        assert_eq!(posts.config().pagination.per_page, 2);
    }

    // =========================================================================
    // Slugs and dates
    // =========================================================================

    #[test]
    fn slug_from_dated_filename() {
        let tmp = project();
        write(tmp.path(), "content/posts/2024-01-02-hello-world.md", "# Hi\n");
        let collections = load_content(tmp.path(), &SiteConfig::default()).unwrap();
        let doc = find_document(find_collection(&collections, "posts"), "hello-world");
        assert_eq!(
            doc.front_matter()["date"],
            Value::String("2024-01-02T00:00:00+00:00".into())
        );
    }

    #[test]
    fn index_slug_is_kept() {
        let tmp = project();
        write(tmp.path(), "content/index.md", "Welcome");
        let collections = load_content(tmp.path(), &SiteConfig::default()).unwrap();
        let doc = find_document(find_collection(&collections, "pages"), "index");
        assert!(doc.date().is_none());
        assert!(doc.front_matter().get("date").is_none());
    }

    #[test]
    fn explicit_slug_wins() {
        let tmp = project();
        write(
            tmp.path(),
            "content/posts/2024-01-02-hello.md",
            "---\nslug: greetings\n---\nbody\n",
        );
        let collections = load_content(tmp.path(), &SiteConfig::default()).unwrap();
        let posts = find_collection(&collections, "posts");
        assert_eq!(document_slugs(posts), vec!["greetings"]);
    }

    #[test]
    fn numeric_slug_is_stringified() {
        let tmp = project();
        write(tmp.path(), "content/posts/x.md", "---\nslug: 404\n---\n");
        let collections = load_content(tmp.path(), &SiteConfig::default()).unwrap();
        find_document(find_collection(&collections, "posts"), "404");
    }

    #[test]
    fn front_matter_date_beats_filename() {
        let tmp = project();
        write(
            tmp.path(),
            "content/posts/2023-05-01-post.md",
            "---\ndate: 2024-03-01 10:30\n---\nbody\n",
        );
        let collections = load_content(tmp.path(), &SiteConfig::default()).unwrap();
        let doc = find_document(find_collection(&collections, "posts"), "post");
        assert_eq!(
            doc.front_matter()["date"],
            Value::String("2024-03-01T10:30:00+00:00".into())
        );
    }

    #[test]
    fn invalid_front_matter_date_falls_back_to_filename() {
        let tmp = project();
        write(
            tmp.path(),
            "content/posts/2023-05-01-post.md",
            "---\ndate: someday\n---\nbody\n",
        );
        let collections = load_content(tmp.path(), &SiteConfig::default()).unwrap();
        let doc = find_document(find_collection(&collections, "posts"), "post");
        assert_eq!(
            doc.front_matter()["date"],
            Value::String("2023-05-01T00:00:00+00:00".into())
        );
    }

    #[test]
    fn invalid_date_without_filename_prefix_stays_undated() {
        let tmp = project();
        write(tmp.path(), "content/posts/post.md", "---\ndate: someday\n---\n");
        let collections = load_content(tmp.path(), &SiteConfig::default()).unwrap();
        let doc = find_document(find_collection(&collections, "posts"), "post");
        assert!(doc.date().is_none());
        assert_eq!(doc.front_matter()["date"], Value::String("someday".into()));
    }

    #[test]
    fn dated_directory_does_not_date_its_files() {
        let tmp = project();
        write(tmp.path(), "content/2024-01-01-archive/post.md", "body");
        let collections = load_content(tmp.path(), &SiteConfig::default()).unwrap();
        let doc = find_document(find_collection(&collections, "2024-01-01-archive"), "post");
        assert!(doc.date().is_none());
    }

    #[test]
    fn collection_and_slug_are_forced_into_front_matter() {
        let tmp = project();
        write(
            tmp.path(),
            "content/posts/real.md",
            "---\ncollection: fake\ntitle: Real\n---\n",
        );
        let collections = load_content(tmp.path(), &SiteConfig::default()).unwrap();
        let doc = find_document(find_collection(&collections, "posts"), "real");
        assert_eq!(doc.front_matter()["collection"], "posts");
        assert_eq!(doc.front_matter()["slug"], "real");
        assert_eq!(doc.front_matter()["title"], "Real");
    }

    #[test]
    fn body_is_rendered_and_raw_kept() {
        let tmp = project();
        write(tmp.path(), "content/about.md", "---\ntitle: About\n---\n**hi**\n");
        let collections = load_content(tmp.path(), &SiteConfig::default()).unwrap();
        let doc = find_document(find_collection(&collections, "pages"), "about");
        assert_eq!(doc.content_raw(), "**hi**\n");
        assert!(doc.content_html().contains("<strong>hi</strong>"));
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn missing_content_root_is_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = load_content(tmp.path(), &SiteConfig::default());
        assert!(matches!(result, Err(ScanError::MissingContentRoot(_))));
    }

    #[test]
    fn malformed_front_matter_names_the_file() {
        let tmp = project();
        write(tmp.path(), "content/broken.md", "---\ntitle: [oops\n---\nbody\n");
        let err = load_content(tmp.path(), &SiteConfig::default()).unwrap_err();
        assert!(matches!(err, ScanError::FrontMatter { .. }));
        assert!(err.to_string().contains("broken.md"));
    }

    #[test]
    fn non_utf8_bytes_are_replaced_not_fatal() {
        let tmp = project();
        fs::write(tmp.path().join("content/latin.md"), b"caf\xe9 au lait\n").unwrap();

        let collections = load_content(tmp.path(), &SiteConfig::default()).unwrap();
        let doc = find_document(find_collection(&collections, "pages"), "latin");
        assert_eq!(doc.content_raw(), "caf\u{FFFD} au lait\n");
        assert!(doc.content_html().contains("au lait"));
    }

    #[test]
    fn unreadable_file_is_read_error_naming_the_path() {
        let tmp = project();
        let path = tmp.path().join("content/gone.md");
        let err = load_document(&path, PAGES_COLLECTION).unwrap_err();
        assert!(matches!(err, ScanError::Read { .. }));
        assert!(err.to_string().contains("gone.md"));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_aborts_content_loading() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = project();
        write(tmp.path(), "content/locked.md", "secret");
        let path = tmp.path().join("content/locked.md");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();
        // Permission bits do not stop root
        if fs::read(&path).is_ok() {
            return;
        }

        let err = load_content(tmp.path(), &SiteConfig::default()).unwrap_err();
        match &err {
            ScanError::Read { path: failed, .. } => assert_eq!(failed, &path),
            other => panic!("expected Read error, got {other:?}"),
        }
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[test]
    fn empty_content_root_has_no_collections() {
        let tmp = project();
        let collections = load_content(tmp.path(), &SiteConfig::default()).unwrap();
        assert!(collections.is_empty());
    }
}
