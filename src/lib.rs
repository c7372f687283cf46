//! # miso
//!
//! A static site generator for Markdown content. Your filesystem is the data
//! source: top-level directories become collections, filenames carry dates
//! and slugs, and templates decide what the HTML looks like.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Scan      content/  →  Collections   (files → classified, dated documents)
//! 2. Generate  Collections  →  _site/     (item pages, listing pages, assets)
//! ```
//!
//! Each build starts from scratch: configuration is re-read, the output
//! directory is emptied, and every page is rendered again. Given the same
//! inputs, two builds produce byte-identical output.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks the content root, classifies files into collections, builds documents |
//! | [`generate`] | Stage 2: sorts, paginates, and renders every collection through the template engine |
//! | [`config`] | `_config/site.yaml` loading, deep merge over stock defaults, menus, validation |
//! | [`document`] | The document model: slug, date, metadata, permalink and title derivation |
//! | [`collection`] | Named, ordered document groups and the publication ordering |
//! | [`paginator`] | Fixed-size page slicing for listings |
//! | [`frontmatter`] | YAML (`---`) and TOML (`+++`) front matter extraction |
//! | [`markdown`] | Markdown to HTML with unsafe link schemes blanked |
//! | [`template`] | The `TemplateEngine` seam and its Tera implementation |
//! | [`naming`] | `YYYY-MM-DD-slug` filename convention parser |
//! | [`files`] | Output directory primitives with path-carrying errors |
//! | [`scaffold`] | Starter project for `miso new` |
//! | [`output`] | CLI output formatting |
//! | [`types`] | Shared metadata types |
//!
//! # Design Decisions
//!
//! ## Directories Are Collections
//!
//! A file's collection is decided once, when it is loaded: the first
//! configured collection path that contains it wins, otherwise its top-level
//! directory names the collection, otherwise it is a page. No front matter key
//! can move a document to another collection.
//!
//! ## Templates Behind a Trait
//!
//! The orchestrator only knows [`template::TemplateEngine`]. Production builds
//! use Tera with templates read from the project; tests swap in a recording
//! engine and assert on the exact contexts each page was rendered with.
//!
//! ## JSON Contexts
//!
//! Front matter, menus, and site settings all end up as `serde_json` values,
//! with key order preserved from the source files. Templates see exactly what
//! the author wrote, plus the resolved `collection`, `slug`, and `date`.

pub mod collection;
pub mod config;
pub mod document;
pub mod files;
pub mod frontmatter;
pub mod generate;
pub mod markdown;
pub mod naming;
pub mod output;
pub mod paginator;
pub mod scaffold;
pub mod scan;
pub mod template;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
