//! CLI output formatting.
//!
//! Output is **content-centric**: every document is shown by its position
//! and title first, with the file it came from or the file it produced as
//! secondary context. The same two-level layout is used by `check` and
//! `build`, so a document reads the same in both.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! 001 pages (2 documents)
//!     001 Welcome
//!         Source: index.md
//!     002 About
//!         Source: about.md
//! 002 posts (3 documents)
//!     001 Spring (2024-03-15)
//!         Source: posts/2024-03-10-spring.md
//!
//! Found 2 collections, 5 documents
//! ```
//!
//! ## Build
//!
//! ```text
//! 001 pages
//!     001 Welcome → index.html
//!     002 About → about/index.html
//! 002 posts
//!     001 Spring → blog/2024/spring/index.html
//!     Listing page 1 → blog/index.html
//!
//! Assets
//!     css/ (1 file)
//!
//! Generated 3 item pages, 1 listing page, 1 asset directory in _site
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::collection::Collections;
use crate::generate::BuildReport;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 file`, `2 files`.
fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

/// Path shown with `/` separators regardless of platform.
fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

// ============================================================================
// Check
// ============================================================================

/// Format the collections found by `check`.
///
/// Source paths are shown relative to `content_root` when possible.
pub fn format_check_output(collections: &Collections, content_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, collection) in collections.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            collection.name(),
            count(collection.len(), "document", "documents")
        ));

        for (j, doc) in collection.documents().iter().enumerate() {
            let date = doc
                .date()
                .map(|d| format!(" ({})", d.format("%Y-%m-%d")))
                .unwrap_or_default();
            lines.push(format!(
                "{}{} {}{}",
                indent(1),
                format_index(j + 1),
                doc.title(),
                date
            ));

            let source = doc
                .source_path()
                .strip_prefix(content_root)
                .unwrap_or(doc.source_path());
            lines.push(format!("{}Source: {}", indent(2), display_path(source)));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Found {}, {}",
        count(collections.len(), "collection", "collections"),
        count(collections.document_count(), "document", "documents")
    ));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(collections: &Collections, content_root: &Path) {
    for line in format_check_output(collections, content_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format a finished build.
///
/// `project_root` is only used to shorten the output directory in the
/// summary line.
pub fn format_build_output(report: &BuildReport, project_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    let mut item_pages = 0;
    let mut listing_pages = 0;

    for (i, collection) in report.collections.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), collection.name));

        for (j, item) in collection.items.iter().enumerate() {
            lines.push(format!(
                "{}{} {} \u{2192} {}",
                indent(1),
                format_index(j + 1),
                item.title,
                display_path(&item.output)
            ));
        }
        for listing in &collection.listings {
            lines.push(format!(
                "{}Listing page {} \u{2192} {}",
                indent(1),
                listing.page,
                display_path(&listing.output)
            ));
        }

        item_pages += collection.items.len();
        listing_pages += collection.listings.len();
    }

    if !report.assets.is_empty() {
        lines.push(String::new());
        lines.push("Assets".to_string());
        for asset in &report.assets {
            lines.push(format!(
                "{}{}/ ({})",
                indent(1),
                asset.directory,
                count(asset.files, "file", "files")
            ));
        }
    }

    let output = report
        .output_dir
        .strip_prefix(project_root)
        .unwrap_or(&report.output_dir);
    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {} in {}",
        count(item_pages, "item page", "item pages"),
        count(listing_pages, "listing page", "listing pages"),
        count(report.assets.len(), "asset directory", "asset directories"),
        display_path(output)
    ));

    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &BuildReport, project_root: &Path) {
    for line in format_build_output(report, project_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Scaffold
// ============================================================================

/// Format the result of `new`: the files created, relative to `target`.
pub fn format_scaffold_output(target: &Path, created: &[std::path::PathBuf]) -> Vec<String> {
    let mut lines = vec![format!("Created {}", target.display())];
    for path in created {
        let shown = path.strip_prefix(target).unwrap_or(path);
        lines.push(format!("{}{}", indent(1), display_path(shown)));
    }
    lines.push(String::new());
    lines.push(format!(
        "Next: miso build --project {}",
        target.display()
    ));
    lines
}

/// Print scaffold output to stdout.
pub fn print_scaffold_output(target: &Path, created: &[std::path::PathBuf]) {
    for line in format_scaffold_output(target, created) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
