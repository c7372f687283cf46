//! Shared test utilities for the miso test suite.
//!
//! Provides fixture setup, small project builders, and lookup helpers that
//! panic with a useful message when something is missing.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let collections = load_content(tmp.path(), &fixture_config(tmp.path())).unwrap();
//!
//! let posts = find_collection(&collections, "posts");
//! let hello = find_document(posts, "hello-world");
//! assert_eq!(hello.title(), "Hello, world");
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::collection::{Collection, Collections};
use crate::config::{self, SiteConfig};
use crate::document::Document;
use crate::types::Metadata;
use chrono::{DateTime, FixedOffset};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    crate::files::copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

/// Configuration of a fixture copy, loaded the way the CLI loads it.
pub fn fixture_config(root: &Path) -> SiteConfig {
    config::load_config(root, None).unwrap()
}

/// An empty project: just a `content/` directory.
pub fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("content")).unwrap();
    tmp
}

/// Write `content` to `root/relative`, creating parent directories.
pub fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Stock defaults with a YAML overlay, validated.
pub fn config_from_yaml(yaml: &str) -> SiteConfig {
    let overlay = serde_yaml::from_str(yaml).unwrap();
    config::resolve_config(config::stock_defaults_value(), Some(overlay)).unwrap()
}

/// Stock defaults with a YAML overlay, *not* validated.
pub fn config_from_value_unchecked(yaml: &str) -> SiteConfig {
    let overlay = serde_yaml::from_str(yaml).unwrap();
    SiteConfig::from_value(config::merge_yaml(config::stock_defaults_value(), overlay))
}

/// A bare document with empty metadata and body.
pub fn document(collection: &str, slug: &str, date: Option<DateTime<FixedOffset>>) -> Document {
    Document::new(
        format!("/content/{collection}/{slug}.md").into(),
        slug.to_string(),
        collection.to_string(),
        Metadata::new(),
        String::new(),
        String::new(),
        date,
    )
}

// =========================================================================
// Lookups: panics with a clear message on miss
// =========================================================================

/// Find a collection by name. Panics if not found.
pub fn find_collection<'a>(collections: &'a Collections, name: &str) -> &'a Collection {
    collections.get(name).unwrap_or_else(|| {
        panic!(
            "collection '{name}' not found. Available: {:?}",
            collections.names()
        )
    })
}

/// Find a document by slug within a collection. Panics if not found.
pub fn find_document<'a>(collection: &'a Collection, slug: &str) -> &'a Document {
    collection
        .documents()
        .iter()
        .find(|d| d.slug() == slug)
        .unwrap_or_else(|| {
            panic!(
                "document '{slug}' not found in collection '{}'. Available: {:?}",
                collection.name(),
                document_slugs(collection)
            )
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All document slugs in collection order.
pub fn document_slugs(collection: &Collection) -> Vec<&str> {
    collection.documents().iter().map(Document::slug).collect()
}
