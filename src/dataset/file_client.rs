//! Storage access used by catalog construction.
//!
//! Paths are `/`-separated strings so the same catalog logic runs against
//! local disk or any key-based backend.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::errors::CatalogError;

/// Directory listing and path joining over some storage backend.
pub trait FileClient {
    /// Names of the immediate subdirectories of `root`, in any order.
    fn list_dirs(&self, root: &str) -> Result<Vec<String>, CatalogError>;

    /// Paths of every file below `dir`, relative to `dir`, in any order.
    fn list_files_recursive(&self, dir: &str) -> Result<Vec<String>, CatalogError>;

    /// Join `child` onto `base`.
    fn join_path(&self, base: &str, child: &str) -> String {
        if base.is_empty() {
            return child.to_string();
        }
        format!("{}/{}", base.trim_end_matches('/'), child.trim_start_matches('/'))
    }
}

/// Reads a text file as a sequence of lines.
pub trait LineReader {
    /// Lines of the file at `path`, without line terminators.
    fn read_lines(&self, path: &str) -> Result<Vec<String>, CatalogError>;
}

/// [`FileClient`] and [`LineReader`] backed by the local filesystem.
///
/// Class folders may be symlinks; symlinked directories below a class folder
/// are not descended into, which keeps link cycles from looping forever.
/// Any directory or entry that cannot be read fails the listing, as does a
/// name that is not valid UTF-8.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFileClient;

impl FileClient for LocalFileClient {
    fn list_dirs(&self, root: &str) -> Result<Vec<String>, CatalogError> {
        let root = Path::new(root);
        let entries = fs::read_dir(root).map_err(|source| io_error(root, source))?;
        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| io_error(root, source))?;
            let path = entry.path();
            if path.is_dir() {
                dirs.push(utf8_name(&entry.file_name(), &path)?);
            }
        }
        Ok(dirs)
    }

    fn list_files_recursive(&self, dir: &str) -> Result<Vec<String>, CatalogError> {
        let root = PathBuf::from(dir);
        let mut files = Vec::new();
        let mut stack = vec![root.clone()];
        while let Some(current) = stack.pop() {
            debug!(dir = %current.display(), "Listing sample directory");
            let entries = fs::read_dir(&current).map_err(|source| io_error(&current, source))?;
            for entry in entries {
                let entry = entry.map_err(|source| io_error(&current, source))?;
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .map_err(|source| io_error(&path, source))?;
                if file_type.is_dir() {
                    stack.push(path);
                } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
                    files.push(relative_key(&root, &path)?);
                }
            }
        }
        Ok(files)
    }
}

impl LineReader for LocalFileClient {
    fn read_lines(&self, path: &str) -> Result<Vec<String>, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| io_error(Path::new(path), source))?;
        Ok(text.lines().map(str::to_string).collect())
    }
}

fn relative_key(root: &Path, path: &Path) -> Result<String, CatalogError> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts = relative
        .components()
        .map(|part| utf8_name(part.as_os_str(), path))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join("/"))
}

/// Recorded paths are reopened later, so lossy conversion is not an option.
fn utf8_name(name: &OsStr, path: &Path) -> Result<String, CatalogError> {
    name.to_str().map(str::to_string).ok_or_else(|| {
        io_error(
            path,
            io::Error::new(io::ErrorKind::InvalidData, "name is not valid UTF-8"),
        )
    })
}

fn io_error(path: &Path, source: io::Error) -> CatalogError {
    CatalogError::Io {
        path: path.display().to_string(),
        source,
    }
}
