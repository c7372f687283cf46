//! Project scaffolding for `miso new`.
//!
//! The starter project is compiled into the binary, so `new` works without
//! any files next to the executable:
//!
//! ```text
//! <target>/
//! ├── _config/site.yaml, menu.yaml
//! ├── content/index.md, about.md, posts/2024-01-01-hello-world.md
//! ├── templates/base.html, page.html, collection-item.html, collection.html
//! └── css/style.css
//! ```
//!
//! A target that does not exist is created. An existing empty directory is
//! filled in. A non-empty directory is refused unless `force` is set, in
//! which case skeleton files overwrite same-named files and everything else
//! is left alone. A target that exists but is not a directory is refused.

use crate::files::{self, FsError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("Target {0} exists and is not a directory")]
    NotADirectory(PathBuf),
    #[error("Target directory {0} is not empty. Pass --force to overwrite.")]
    NotEmpty(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Fs(#[from] FsError),
}

/// `(relative path, contents)` of every skeleton file.
pub const SKELETON: &[(&str, &str)] = &[
    ("_config/site.yaml", include_str!("../skeleton/_config/site.yaml")),
    ("_config/menu.yaml", include_str!("../skeleton/_config/menu.yaml")),
    ("content/index.md", include_str!("../skeleton/content/index.md")),
    ("content/about.md", include_str!("../skeleton/content/about.md")),
    (
        "content/posts/2024-01-01-hello-world.md",
        include_str!("../skeleton/content/posts/2024-01-01-hello-world.md"),
    ),
    ("templates/base.html", include_str!("../skeleton/templates/base.html")),
    ("templates/page.html", include_str!("../skeleton/templates/page.html")),
    (
        "templates/collection-item.html",
        include_str!("../skeleton/templates/collection-item.html"),
    ),
    (
        "templates/collection.html",
        include_str!("../skeleton/templates/collection.html"),
    ),
    ("css/style.css", include_str!("../skeleton/css/style.css")),
];

/// Write the skeleton into `target`. Returns the files written.
pub fn scaffold(target: &Path, force: bool) -> Result<Vec<PathBuf>, ScaffoldError> {
    if target.exists() && !target.is_dir() {
        return Err(ScaffoldError::NotADirectory(target.to_path_buf()));
    }

    if !target.is_dir() {
        files::ensure_dir(target)?;
    } else if !force && fs::read_dir(target)?.next().is_some() {
        return Err(ScaffoldError::NotEmpty(target.to_path_buf()));
    }

    let mut written = Vec::with_capacity(SKELETON.len());
    for (relative, contents) in SKELETON {
        let path = target.join(relative);
        files::write_file(&path, contents)?;
        written.push(path);
    }
    info!(target = %target.display(), files = written.len(), "scaffolded project");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::generate;
    use tempfile::TempDir;

    #[test]
    fn scaffold_creates_missing_target() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("new-site");
        let written = scaffold(&target, false).unwrap();

        assert_eq!(written.len(), SKELETON.len());
        assert!(target.join("_config/site.yaml").is_file());
        assert!(target.join("templates/collection.html").is_file());
    }

    #[test]
    fn scaffold_fills_empty_directory() {
        let tmp = TempDir::new().unwrap();
        scaffold(tmp.path(), false).unwrap();
        assert!(tmp.path().join("content/index.md").is_file());
    }

    #[test]
    fn scaffold_refuses_non_empty_directory() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("keep.txt"), "mine").unwrap();

        let err = scaffold(tmp.path(), false).unwrap_err();
        assert!(matches!(err, ScaffoldError::NotEmpty(_)));
        assert!(err.to_string().contains("--force"));
        assert!(!tmp.path().join("content").exists());
    }

    #[test]
    fn scaffold_force_overwrites_but_keeps_other_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("keep.txt"), "mine").unwrap();
        fs::create_dir_all(tmp.path().join("content")).unwrap();
        fs::write(tmp.path().join("content/index.md"), "old").unwrap();

        scaffold(tmp.path(), true).unwrap();

        assert_eq!(fs::read_to_string(tmp.path().join("keep.txt")).unwrap(), "mine");
        let index = fs::read_to_string(tmp.path().join("content/index.md")).unwrap();
        assert_ne!(index, "old");
    }

    #[test]
    fn scaffold_refuses_file_target() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("site");
        fs::write(&file, "x").unwrap();

        let err = scaffold(&file, true).unwrap_err();
        assert!(matches!(err, ScaffoldError::NotADirectory(_)));
    }

    #[test]
    fn skeleton_config_is_valid() {
        let tmp = TempDir::new().unwrap();
        scaffold(tmp.path(), false).unwrap();
        let config = config::load_config(tmp.path(), None).unwrap();
        assert_eq!(config.collection_names(), vec!["posts"]);
        assert_eq!(config.menus()["main"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn scaffolded_project_builds() {
        let tmp = TempDir::new().unwrap();
        scaffold(tmp.path(), false).unwrap();
        let config = config::load_config(tmp.path(), None).unwrap();
        let report = generate::build(tmp.path(), &config).unwrap();

        let out = tmp.path().join("_site");
        assert!(out.join("index.html").is_file());
        assert!(out.join("about/index.html").is_file());
        assert!(out.join("posts/2024/hello-world/index.html").is_file());
        assert!(out.join("posts/index.html").is_file());
        assert!(out.join("css/style.css").is_file());
        assert_eq!(report.page_count(), 4);

        let post = fs::read_to_string(out.join("posts/2024/hello-world/index.html")).unwrap();
        assert!(post.contains("<strong>Markdown</strong>"));
        assert!(post.contains("2024-01-01"));
    }
}
