//! Filesystem primitives used by the build.
//!
//! Every failure carries the path it happened on; the raw `io::Error` alone
//! rarely says which of a few hundred output files was the problem.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FsError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to remove {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Create `path` and any missing parents.
pub fn ensure_dir(path: &Path) -> Result<(), FsError> {
    fs::create_dir_all(path).map_err(|source| FsError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Delete everything inside `path`, keeping the directory itself.
///
/// Symlinks are removed, never followed.
pub fn empty_dir(path: &Path) -> Result<(), FsError> {
    for entry in fs::read_dir(path).map_err(remove_err(path))? {
        let entry = entry.map_err(remove_err(path))?;
        let entry_path = entry.path();
        let file_type = entry.file_type().map_err(remove_err(&entry_path))?;
        if file_type.is_dir() {
            fs::remove_dir_all(&entry_path).map_err(remove_err(&entry_path))?;
        } else {
            fs::remove_file(&entry_path).map_err(remove_err(&entry_path))?;
        }
    }
    Ok(())
}

/// Recursively copy the contents of `src` into `dst`, creating `dst` as
/// needed. Returns the number of files copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<usize, FsError> {
    ensure_dir(dst)?;

    let mut entries = fs::read_dir(src)
        .map_err(copy_err(src, dst))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(copy_err(src, dst))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut copied = 0;
    for entry in entries {
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copied += copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path).map_err(copy_err(&src_path, &dst_path))?;
            copied += 1;
        }
    }
    Ok(copied)
}

fn remove_err(path: &Path) -> impl FnOnce(io::Error) -> FsError {
    let path = path.to_path_buf();
    move |source| FsError::Remove { path, source }
}

fn copy_err(from: &Path, to: &Path) -> impl FnOnce(io::Error) -> FsError {
    let (from, to) = (from.to_path_buf(), to.to_path_buf());
    move |source| FsError::Copy { from, to, source }
}

/// Collapse `.` and `..` components without touching the filesystem.
///
/// A `..` that would climb above the start of a relative path is kept, so
/// `../site` stays `../site` while `a/../.` becomes the empty path.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Absolute, normalized form of `path` for comparing directories.
///
/// Existing paths are canonicalized so symlinks resolve to their targets.
/// For a path that does not exist yet, the nearest existing ancestor is
/// canonicalized and the rest is appended lexically.
pub fn resolve_dir(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let absolute = normalize_lexically(&absolute);

    let mut existing = absolute.as_path();
    let mut rest = Vec::new();
    loop {
        if let Ok(canonical) = fs::canonicalize(existing) {
            return rest.iter().rev().fold(canonical, |acc, name| acc.join(name));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => return absolute,
        }
    }
}

/// Write `contents` to `path`, creating parent directories first.
pub fn write_file(path: &Path, contents: &str) -> Result<(), FsError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).map_err(|source| FsError::Write {
        path: path.to_path_buf(),
        source,
    })
}
