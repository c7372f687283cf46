//! Site generation.
//!
//! Stage 2 of the build. Takes the classified collections and renders the
//! final static site:
//!
//! 1. Validate configuration (nothing is touched if it is invalid), including
//!    that the output directory cannot swallow the project or its sources
//! 2. Reset the output directory (contents removed, directory kept)
//! 3. Load content ([`scan::load_content`])
//! 4. Per collection, in discovery order: sort newest first, render one page
//!    per document, then render the paginated listing (not for `pages`)
//! 5. Copy static asset directories
//!
//! The first error stops the build. Output written before it stays on disk.
//!
//! ## Generated Pages
//!
//! - **Item pages**: `<output>/<permalink>/index.html`. `pages/index.md`
//!   (and any document whose permalink is `/`) becomes `<output>/index.html`.
//! - **Listing pages**: `<output>/<list_permalink>/index.html` for page 1,
//!   `<output>/<list_permalink>/page/<n>/index.html` after that.
//!
//! ## Template Contexts
//!
//! Item pages see `site`, `page` (front matter), `content` (rendered HTML),
//! `collection`, and `menus`. Listing pages see `site`, `collection`,
//! `documents` (the current page), `menus`, and `pagination`:
//!
//! ```text
//! pagination.page           current page, 1-based
//! pagination.per_page       configured page size
//! pagination.total_pages    number of listing pages
//! pagination.previous_page  page number or null
//! pagination.next_page      page number or null
//! pagination.previous_url   listing URL or null
//! pagination.next_url       listing URL or null
//! ```
//!
//! Every document handed to a template (in `collection.documents` or
//! `documents`) carries `slug`, `collection`, `title`, `date`, `url`, `page`,
//! and `content`.

use crate::collection::{Collection, Collections, publication_order};
use crate::config::{ConfigError, SiteConfig};
use crate::document::{Document, PAGES_COLLECTION};
use crate::files::{self, FsError};
use crate::paginator::PaginatorError;
use crate::scan::{self, ScanError};
use crate::template::{TemplateEngine, TemplateError, TeraEngine};
use crate::types::scalar_to_string;
use serde::Serialize;
use serde_json::{Value, json};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Item layout for documents in `pages`.
pub const DEFAULT_PAGE_LAYOUT: &str = "page.html";
/// Item layout for documents in every other collection.
pub const DEFAULT_ITEM_LAYOUT: &str = "collection-item.html";
/// Listing layout.
pub const DEFAULT_LISTING_LAYOUT: &str = "collection.html";

const ITEM_NOT_FOUND_HINT: &str = "Update the file front matter (layout key) or the collection \
     layout to reference an existing template (for example post.html).";
const ITEM_RENDER_HINT: &str = "Check the template for references to missing variables.";
const LISTING_NOT_FOUND_HINT: &str =
    "Check the collection list_layout setting in _config/site.yaml.";
const LISTING_RENDER_HINT: &str =
    "Check the listing template for references to missing variables.";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Scan(#[from] ScanError),
    #[error("Template error: {0}")]
    TemplateLoad(#[from] TemplateError),
    #[error("Cannot paginate collection \"{collection}\": {source}")]
    Pagination {
        collection: String,
        source: PaginatorError,
    },
    #[error("Failed rendering \"{path}\" using layout \"{layout}\": {message}. {hint}")]
    ItemRender {
        path: PathBuf,
        layout: String,
        message: String,
        hint: &'static str,
    },
    #[error(
        "Failed rendering listing for collection \"{collection}\" (page {page}) using layout \"{layout}\": {message}. {hint}"
    )]
    ListingRender {
        collection: String,
        page: usize,
        layout: String,
        message: String,
        hint: &'static str,
    },
    #[error("Permalink \"{permalink}\" of {path} points outside the output directory")]
    InvalidPermalink { path: PathBuf, permalink: String },
    #[error("{0}")]
    Fs(#[from] FsError),
}

/// What a build wrote. Paths are relative to `output_dir`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    pub collections: Vec<CollectionReport>,
    pub assets: Vec<AssetReport>,
}

impl BuildReport {
    /// Number of HTML pages written.
    pub fn page_count(&self) -> usize {
        self.collections
            .iter()
            .map(|c| c.items.len() + c.listings.len())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionReport {
    pub name: String,
    pub items: Vec<ItemPage>,
    pub listings: Vec<ListingPage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemPage {
    pub slug: String,
    pub title: String,
    pub layout: String,
    pub url: String,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPage {
    pub page: usize,
    pub url: String,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetReport {
    pub directory: String,
    pub files: usize,
}

/// Build the site with templates loaded from `paths.templates`.
pub fn build(project_root: &Path, config: &SiteConfig) -> Result<BuildReport, BuildError> {
    config.validate()?;
    let templates_dir = project_root.join(trim_dir(config.path("templates")?));
    let engine = TeraEngine::from_dir(&templates_dir)?;
    build_with_engine(project_root, config, &engine)
}

/// Build the site with a caller-supplied template engine.
pub fn build_with_engine<E>(
    project_root: &Path,
    config: &SiteConfig,
    engine: &E,
) -> Result<BuildReport, BuildError>
where
    E: TemplateEngine + ?Sized,
{
    config.validate()?;
    config.check_directories(project_root)?;

    let output_dir = output_dir(project_root, config)?;
    info!(output = %output_dir.display(), "preparing output directory");
    files::ensure_dir(&output_dir)?;
    files::empty_dir(&output_dir)?;

    let mut collections = scan::load_content(project_root, config)?;
    for collection in collections.iter_mut() {
        collection.sort_by(publication_order);
    }

    let renderer = Renderer {
        engine,
        output_dir: &output_dir,
        site: config.site_meta(),
        menus: Value::Object(config.menus().clone()),
    };

    let mut reports = Vec::with_capacity(collections.len());
    for collection in &collections {
        info!(collection = collection.name(), documents = collection.len(), "rendering");
        let items = renderer.render_items(collection)?;
        let listings = if collection.name() == PAGES_COLLECTION {
            Vec::new()
        } else {
            renderer.render_listings(collection)?
        };
        reports.push(CollectionReport {
            name: collection.name().to_string(),
            items,
            listings,
        });
    }

    let assets = copy_assets(project_root, config, &output_dir)?;

    Ok(BuildReport {
        output_dir,
        collections: reports,
        assets,
    })
}

/// Validate configuration and classify content without writing anything.
pub fn check(project_root: &Path, config: &SiteConfig) -> Result<Collections, BuildError> {
    config.validate()?;
    let mut collections = scan::load_content(project_root, config)?;
    for collection in collections.iter_mut() {
        collection.sort_by(publication_order);
    }
    Ok(collections)
}

/// Absolute output directory: `<project>/<paths.output>`.
pub fn output_dir(project_root: &Path, config: &SiteConfig) -> Result<PathBuf, ConfigError> {
    Ok(project_root.join(trim_dir(config.path("output")?)))
}

fn trim_dir(path: &str) -> &str {
    path.trim_end_matches(['/', '\\'])
}

struct Renderer<'a, E: ?Sized> {
    engine: &'a E,
    output_dir: &'a Path,
    site: Value,
    menus: Value,
}

impl<E: TemplateEngine + ?Sized> Renderer<'_, E> {
    fn render_items(&self, collection: &Collection) -> Result<Vec<ItemPage>, BuildError> {
        let default_layout = if collection.name() == PAGES_COLLECTION {
            DEFAULT_PAGE_LAYOUT
        } else {
            DEFAULT_ITEM_LAYOUT
        };
        let item_layout = collection.item_layout().unwrap_or(default_layout);
        let collection_ctx = collection_context(collection);

        let mut pages = Vec::with_capacity(collection.len());
        for doc in collection.documents() {
            let layout = doc
                .front_matter()
                .get("layout")
                .and_then(Value::as_str)
                .unwrap_or(item_layout);

            let context = json!({
                "site": self.site,
                "page": doc.front_matter(),
                "content": doc.content_html(),
                "collection": collection_ctx,
                "menus": self.menus,
            });
            let html = self.engine.render(layout, &context).map_err(|e| {
                let hint = match e {
                    TemplateError::NotFound(_) => ITEM_NOT_FOUND_HINT,
                    _ => ITEM_RENDER_HINT,
                };
                BuildError::ItemRender {
                    path: doc.source_path().to_path_buf(),
                    layout: layout.to_string(),
                    message: e.to_string(),
                    hint,
                }
            })?;

            let url = resolved_permalink(doc, collection);
            let is_root_index =
                doc.slug() == "index" && collection.name() == PAGES_COLLECTION;
            let output = destination(&url, is_root_index).ok_or_else(|| {
                BuildError::InvalidPermalink {
                    path: doc.source_path().to_path_buf(),
                    permalink: url.clone(),
                }
            })?;
            files::write_file(&self.output_dir.join(&output), &html)?;
            debug!(slug = doc.slug(), output = %output.display(), "wrote item page");

            pages.push(ItemPage {
                slug: doc.slug().to_string(),
                title: doc.title(),
                layout: layout.to_string(),
                url,
                output,
            });
        }
        Ok(pages)
    }

    fn render_listings(&self, collection: &Collection) -> Result<Vec<ListingPage>, BuildError> {
        let layout = collection.listing_layout().unwrap_or(DEFAULT_LISTING_LAYOUT);
        let paginator = collection
            .paginate()
            .map_err(|source| BuildError::Pagination {
                collection: collection.name().to_string(),
                source,
            })?;
        let total_pages = paginator.page_count();
        let collection_ctx = collection_context(collection);

        let mut pages = Vec::with_capacity(total_pages);
        for page in 1..=total_pages {
            let url = listing_permalink(collection, page);
            let previous_page = (page > 1).then(|| page - 1);
            let next_page = (page < total_pages).then(|| page + 1);
            let documents: Vec<Value> = paginator
                .page(page)
                .iter()
                .map(|doc| document_context(doc, collection))
                .collect();

            let context = json!({
                "site": self.site,
                "collection": collection_ctx,
                "documents": documents,
                "menus": self.menus,
                "pagination": {
                    "page": page,
                    "per_page": paginator.per_page(),
                    "total_pages": total_pages,
                    "previous_page": previous_page,
                    "next_page": next_page,
                    "previous_url": previous_page.map(|n| listing_permalink(collection, n)),
                    "next_url": next_page.map(|n| listing_permalink(collection, n)),
                },
            });
            let html = self.engine.render(layout, &context).map_err(|e| {
                let hint = match e {
                    TemplateError::NotFound(_) => LISTING_NOT_FOUND_HINT,
                    _ => LISTING_RENDER_HINT,
                };
                BuildError::ListingRender {
                    collection: collection.name().to_string(),
                    page,
                    layout: layout.to_string(),
                    message: e.to_string(),
                    hint,
                }
            })?;

            let output = destination(&url, false).ok_or_else(|| BuildError::InvalidPermalink {
                path: PathBuf::from(collection.name()),
                permalink: url.clone(),
            })?;
            files::write_file(&self.output_dir.join(&output), &html)?;
            debug!(collection = collection.name(), page, output = %output.display(), "wrote listing page");

            pages.push(ListingPage { page, url, output });
        }
        Ok(pages)
    }
}

/// The URL a document is published at: its front matter `permalink` if set,
/// otherwise computed from the collection's pattern.
pub fn resolved_permalink(doc: &Document, collection: &Collection) -> String {
    doc.front_matter()
        .get("permalink")
        .and_then(scalar_to_string)
        .unwrap_or_else(|| doc.permalink("", collection.permalink_pattern()))
}

/// URL of listing page `page` (1-based) for a collection.
pub fn listing_permalink(collection: &Collection, page: usize) -> String {
    let base = collection
        .list_permalink()
        .map(str::to_string)
        .unwrap_or_else(|| format!("/{}/", collection.name()));
    if page > 1 {
        format!("{}/page/{page}/", base.trim_end_matches('/'))
    } else {
        base
    }
}

/// Output file for a permalink, relative to the output directory.
///
/// Returns `None` if the permalink climbs out of the output directory.
pub fn destination(permalink: &str, is_root_index: bool) -> Option<PathBuf> {
    let trimmed = permalink.trim_matches('/');
    if trimmed.is_empty() || is_root_index {
        return Some(PathBuf::from("index.html"));
    }

    let mut path = PathBuf::new();
    for segment in trimmed.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            _ => path.push(segment),
        }
    }
    if path.components().any(|c| !matches!(c, Component::Normal(_))) {
        return None;
    }
    path.push("index.html");
    Some(path)
}

/// Template view of a document.
pub fn document_context(doc: &Document, collection: &Collection) -> Value {
    json!({
        "slug": doc.slug(),
        "collection": doc.collection(),
        "title": doc.title(),
        "date": doc.front_matter().get("date").cloned().unwrap_or(Value::Null),
        "url": resolved_permalink(doc, collection),
        "page": doc.front_matter(),
        "content": doc.content_html(),
    })
}

/// Template view of a collection: its name, settings, and documents.
pub fn collection_context(collection: &Collection) -> Value {
    let documents: Vec<Value> = collection
        .documents()
        .iter()
        .map(|doc| document_context(doc, collection))
        .collect();
    json!({
        "name": collection.name(),
        "config": collection.config(),
        "documents": documents,
    })
}

fn copy_assets(
    project_root: &Path,
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<Vec<AssetReport>, BuildError> {
    let mut copied = Vec::new();
    for directory in config.asset_directories() {
        let relative = trim_dir(&directory);
        if Path::new(relative)
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            warn!(directory = %directory, "skipping asset directory outside the project");
            continue;
        }

        let source = project_root.join(relative);
        if !source.is_dir() {
            debug!(directory = %directory, "asset directory not found, skipping");
            continue;
        }
        if output_dir.starts_with(&source) {
            warn!(directory = %directory, "skipping asset directory that contains the output");
            continue;
        }

        let files = files::copy_dir_recursive(&source, &output_dir.join(relative))?;
        debug!(directory = %directory, files, "copied assets");
        copied.push(AssetReport {
            directory: relative.to_string(),
            files,
        });
    }
    Ok(copied)
}
