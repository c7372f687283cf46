//! Site configuration.
//!
//! Configuration is a single YAML file, `_config/site.yaml` in the project
//! root, deep-merged over the stock defaults. Menus live next to it in
//! `menu.yaml` and are loaded independently.
//!
//! ```text
//! my-site/
//! ├── _config/
//! │   ├── site.yaml     # optional, overrides stock defaults
//! │   └── menu.yaml     # optional, named navigation menus
//! ├── content/          # paths.content
//! ├── templates/        # paths.templates
//! └── css/              # paths.assets (copied verbatim)
//! ```
//!
//! ## Merging
//!
//! The user file is sparse: it names only what it changes. Mappings merge key
//! by key, everything else (scalars and sequences alike) replaces the default
//! outright. See [`merge_yaml`].
//!
//! ## Access
//!
//! [`SiteConfig`] keeps the merged document and answers dotted-path queries
//! (`site.seo.author`). The parts the build depends on have typed accessors
//! that report malformed values as [`ConfigError`]s; [`SiteConfig::validate`]
//! runs all of them up front so a bad config fails before any file is touched.

use crate::files;
use crate::types::Menus;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use serde_yaml::Value;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Path configuration for [{key}] must be a string")]
    InvalidPath { key: String },
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Directory holding `site.yaml` and `menu.yaml`, relative to the project root.
pub const CONFIG_DIR: &str = "_config";
/// Main configuration file name.
pub const CONFIG_FILE: &str = "site.yaml";
/// Menu file name, looked up next to the main configuration file.
pub const MENU_FILE: &str = "menu.yaml";

/// Page size used when a collection does not set `pagination.per_page`.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Per-collection settings from the `collections` block.
///
/// Unknown keys are kept in `extra` and handed to templates along with the
/// known ones, so themes can read their own collection options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Directory holding the collection's files. Absolute, project-relative
    /// (`content/posts`), or content-relative (`posts`).
    pub path: Option<String>,
    /// Template for each document page.
    pub layout: Option<String>,
    /// Template for the paginated listing pages.
    pub list_layout: Option<String>,
    /// Document permalink pattern, e.g. `blog/{year}/{month}/{slug}`.
    pub permalink: Option<String>,
    /// Listing base permalink. Defaults to `/<name>/`.
    pub list_permalink: Option<String>,
    pub pagination: PaginationConfig,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, JsonValue>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            path: None,
            layout: None,
            list_layout: None,
            permalink: None,
            list_permalink: None,
            pagination: PaginationConfig::default(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Listing pagination settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Documents per listing page. Must be at least 1.
    pub per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Resolved configuration: merged settings plus menus.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    values: Value,
    menus: Menus,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::from_value(stock_defaults_value())
    }
}

impl SiteConfig {
    /// Wrap an already-merged configuration document. Menus start empty.
    pub fn from_value(values: Value) -> Self {
        Self {
            values,
            menus: Menus::new(),
        }
    }

    /// Attach menus loaded from `menu.yaml`.
    pub fn with_menus(mut self, menus: Menus) -> Self {
        self.menus = menus;
        self
    }

    /// Look up a value by dotted key path, e.g. `"site.seo.author"`.
    ///
    /// Returns `None` as soon as a segment is missing or a non-mapping value
    /// is reached before the path is exhausted.
    pub fn get(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(&self.values, |value, segment| value.as_mapping()?.get(segment))
    }

    /// A `paths.<key>` entry, which must be a string.
    pub fn path(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(&format!("paths.{key}"))
            .and_then(Value::as_str)
            .ok_or_else(|| ConfigError::InvalidPath {
                key: key.to_string(),
            })
    }

    /// Static asset directories to copy into the output. Non-string entries
    /// are ignored; a non-list value means no assets.
    pub fn asset_directories(&self) -> Vec<String> {
        self.get("paths.assets")
            .and_then(Value::as_sequence)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The `site` block as a template value.
    pub fn site_meta(&self) -> JsonValue {
        self.get("site")
            .map(yaml_to_json)
            .unwrap_or_else(|| JsonValue::Object(serde_json::Map::new()))
    }

    /// Configured collection names, in the order they appear in the file.
    pub fn collection_names(&self) -> Vec<String> {
        self.get("collections")
            .and_then(Value::as_mapping)
            .map(|collections| {
                collections
                    .keys()
                    .filter_map(|key| yaml_key_to_string(key))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Settings for one collection; defaults if it is not configured.
    pub fn collection_config(&self, name: &str) -> Result<CollectionConfig, ConfigError> {
        let Some(block) = self
            .get("collections")
            .and_then(Value::as_mapping)
            .and_then(|collections| collections.get(name))
        else {
            return Ok(CollectionConfig::default());
        };

        if block.is_null() {
            return Ok(CollectionConfig::default());
        }

        serde_yaml::from_value(block.clone()).map_err(|e| {
            ConfigError::Validation(format!("collections.{name}: {e}"))
        })
    }

    /// Menus loaded from `menu.yaml`, empty if there was none.
    pub fn menus(&self) -> &Menus {
        &self.menus
    }

    /// Check every setting the build relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.values.is_mapping() {
            return Err(ConfigError::Validation(
                "configuration must be a mapping at the top level".into(),
            ));
        }

        for key in ["content", "templates", "output"] {
            self.path(key)?;
        }

        let output = files::normalize_lexically(Path::new(self.path("output")?));
        if output
            .components()
            .all(|c| matches!(c, Component::ParentDir))
        {
            return Err(ConfigError::Validation(
                "paths.output must name a directory inside the project, not the project root"
                    .into(),
            ));
        }

        match self.get("collections") {
            None | Some(Value::Null) | Some(Value::Mapping(_)) => {}
            Some(_) => {
                return Err(ConfigError::Validation(
                    "collections must be a mapping of name to settings".into(),
                ));
            }
        }

        for name in self.collection_names() {
            let config = self.collection_config(&name)?;
            if config.pagination.per_page < 1 {
                return Err(ConfigError::Validation(format!(
                    "collections.{name}.pagination.per_page must be at least 1"
                )));
            }
        }

        Ok(())
    }

    /// Check where the configured directories land for a project on disk.
    ///
    /// The output directory is emptied on every build, so it must not be the
    /// project root or one of its ancestors, and must not be or contain the
    /// content or templates directory. Paths are compared after resolving
    /// `.`, `..`, and symlinks.
    pub fn check_directories(&self, project_root: &Path) -> Result<(), ConfigError> {
        let resolve = |key: &str| -> Result<PathBuf, ConfigError> {
            Ok(files::resolve_dir(&project_root.join(self.path(key)?)))
        };
        let root = files::resolve_dir(project_root);
        let output = resolve("output")?;

        if root.starts_with(&output) {
            return Err(ConfigError::Validation(format!(
                "paths.output resolves to {}, which would contain the project itself",
                output.display()
            )));
        }
        for key in ["content", "templates"] {
            let protected = resolve(key)?;
            if protected.starts_with(&output) {
                return Err(ConfigError::Validation(format!(
                    "paths.output resolves to {}, which would contain paths.{key} ({})",
                    output.display(),
                    protected.display()
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock defaults as a YAML mapping: the base layer that user
/// files are merged over.
pub fn stock_defaults_value() -> Value {
    serde_yaml::from_str(stock_config_yaml()).expect("stock config must be valid YAML")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Mappings are merged key-by-key (overlay keys override base keys).
/// - Any other overlay value, sequences included, replaces the base value.
/// - Keys in base that are not in overlay are preserved, in their original
///   position; new keys are appended.
pub fn merge_yaml(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base_map), Value::Mapping(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = match base_map.get_mut(&key) {
                    Some(base_val) => merge_yaml(std::mem::take(base_val), overlay_val),
                    None => overlay_val,
                };
                base_map.insert(key, merged);
            }
            Value::Mapping(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Load a YAML file as a raw value.
///
/// Returns `Ok(None)` if the file doesn't exist or is empty.
pub fn load_raw_config(path: &Path) -> Result<Option<Value>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: Value = serde_yaml::from_str(&content)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value and validate the result.
pub fn resolve_config(base: Value, overlay: Option<Value>) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) if !ov.is_mapping() => {
            return Err(ConfigError::Validation(
                "configuration file must contain a mapping at the top level".into(),
            ));
        }
        Some(ov) => merge_yaml(base, ov),
        None => base,
    };
    let config = SiteConfig::from_value(merged);
    config.validate()?;
    Ok(config)
}

/// Default location of the main configuration file for a project.
pub fn default_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Load the project configuration.
///
/// With `config_path` unset, `_config/site.yaml` is used if it exists and
/// stock defaults otherwise. An explicitly given path must exist. Menus are
/// read from `menu.yaml` in the same directory as the configuration file.
pub fn load_config(project_root: &Path, config_path: Option<&Path>) -> Result<SiteConfig, ConfigError> {
    let path = match config_path {
        Some(explicit) => {
            if !explicit.is_file() {
                return Err(ConfigError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("config file {} not found", explicit.display()),
                )));
            }
            explicit.to_path_buf()
        }
        None => default_config_path(project_root),
    };

    let overlay = load_raw_config(&path)?;
    let config = resolve_config(stock_defaults_value(), overlay)?;

    let menu_path = path
        .parent()
        .map(|dir| dir.join(MENU_FILE))
        .unwrap_or_else(|| PathBuf::from(MENU_FILE));
    let menus = load_menus(&menu_path)?;

    Ok(config.with_menus(menus))
}

/// Load named menus from a YAML file.
///
/// The file maps menu names to lists of item records. Entries that are not
/// lists become empty lists (a mapping contributes its values, in order); a
/// missing file or a non-mapping document yields no menus.
pub fn load_menus(path: &Path) -> Result<Menus, ConfigError> {
    let Some(raw) = load_raw_config(path)? else {
        return Ok(Menus::new());
    };
    let Value::Mapping(entries) = raw else {
        return Ok(Menus::new());
    };

    let mut menus = Menus::new();
    for (name, items) in &entries {
        let Some(name) = yaml_key_to_string(name) else {
            continue;
        };
        let items: Vec<JsonValue> = match items {
            Value::Sequence(seq) => seq.iter().map(yaml_to_json).collect(),
            Value::Mapping(map) => map.values().map(yaml_to_json).collect(),
            _ => Vec::new(),
        };
        menus.insert(name, JsonValue::Array(items));
    }
    Ok(menus)
}

/// Convert a YAML value into the JSON shape used for template contexts.
///
/// Mapping keys that are not scalars are dropped; tags are discarded and
/// their inner value kept.
pub fn yaml_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::from(i)
            } else if let Some(u) = n.as_u64() {
                JsonValue::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(JsonValue::Number)
                    .unwrap_or(JsonValue::Null)
            }
        }
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Sequence(items) => JsonValue::Array(items.iter().map(yaml_to_json).collect()),
        Value::Mapping(map) => JsonValue::Object(
            map.iter()
                .filter_map(|(k, v)| yaml_key_to_string(k).map(|k| (k, yaml_to_json(v))))
                .collect(),
        ),
        Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

fn yaml_key_to_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Returns a fully-commented stock `site.yaml` with all keys and explanations.
///
/// This is also the source of the built-in defaults, so the documentation
/// cannot drift from the behavior. Printed by the `gen-config` command.
pub fn stock_config_yaml() -> &'static str {
    r##"# miso configuration
# ==================
# All settings are optional. Values shown below are the defaults.
# Place this file at _config/site.yaml in your project. Only the keys you
# want to change are needed; mappings merge with these defaults key by key,
# lists and plain values replace them.

# ---------------------------------------------------------------------------
# Site metadata, available to every template as `site`
# ---------------------------------------------------------------------------
site:
  title: My Site
  base_url: ""
  description: ""
  seo:
    author: ""
    default_keywords: []
    canonical: ""
    open_graph:
      title: null
      description: null
      image: null
      url: null
      type: website
      locale: en_US
      site_name: null
    twitter:
      card: summary_large_image
      site: ""
      creator: ""
      title: null
      description: null
      image: null

# ---------------------------------------------------------------------------
# Project layout, relative to the project root
# ---------------------------------------------------------------------------
paths:
  content: content
  templates: templates
  output: _site
  # Directories copied verbatim into the output (missing ones are skipped).
  assets:
    - css

# ---------------------------------------------------------------------------
# Collections
# ---------------------------------------------------------------------------
# Every top-level directory under the content root is a collection named
# after it; loose files in the root belong to the `pages` collection.
# Configure a collection to change its source directory, templates,
# permalinks, or page size:
#
# collections:
#   posts:
#     path: content/blog                 # default: content/<name>
#     layout: post.html                  # default: collection-item.html
#     list_layout: blog.html             # default: collection.html
#     permalink: "blog/{year}/{month}/{slug}"
#     list_permalink: /blog/             # default: /<name>/
#     pagination:
#       per_page: 5                      # default: 10
#
# Permalink placeholders: {collection} {slug} {filename} {year} {month} {day}
collections: {}
"##
}
